//! Embedded HTML/CSS/JS frontend for the homeval web UI.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page UI.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>homeval</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1100px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.health-badges { display: flex; gap: 8px; }
.badge {
  display: inline-flex; align-items: center; gap: 4px;
  padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 500;
  background: var(--surface); border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.warn { border-color: var(--yellow); color: var(--yellow); }
.badge.err { border-color: var(--red); color: var(--red); }

nav {
  display: flex; gap: 4px; margin-bottom: 24px;
  background: var(--surface); border-radius: var(--radius);
  padding: 4px; border: 1px solid var(--border);
}
nav button {
  flex: 1; padding: 8px 16px; border: none; border-radius: 6px;
  background: transparent; color: var(--text-muted);
  font-size: 13px; font-weight: 500; cursor: pointer;
}
nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

.panel { display: none; }
.panel.active { display: block; }

.card {
  background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 20px; margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }

.form-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 14px; }
.form-grid label { display: block; font-size: 12px; color: var(--text-muted); margin-bottom: 4px; }
.form-grid input, .form-grid select {
  width: 100%; padding: 8px 10px; border-radius: 6px;
  border: 1px solid var(--border); background: var(--bg); color: var(--text);
}
.form-grid input:disabled, .form-grid select:disabled { opacity: 0.5; }

.btn {
  padding: 8px 18px; border-radius: 6px; border: 1px solid var(--border);
  background: var(--surface); color: var(--text); cursor: pointer; font-weight: 500;
}
.btn.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
.btn:disabled { opacity: 0.5; cursor: default; }
.btn-group { display: flex; gap: 8px; margin-top: 16px; }

.alert { padding: 12px 16px; border-radius: 6px; margin-bottom: 16px; border: 1px solid var(--red); color: var(--red); }

.result .price { font-size: 36px; font-weight: 700; font-family: var(--mono); color: var(--green); }
.result .sub { color: var(--text-muted); font-family: var(--mono); }
.result .range { margin-top: 12px; }

.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 24px; }
.stat-card {
  background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 20px; text-align: center;
}
.stat-card .value { font-size: 28px; font-weight: 700; font-family: var(--mono); color: var(--accent); }
.stat-card .label { font-size: 12px; color: var(--text-muted); margin-top: 6px; text-transform: uppercase; letter-spacing: 0.5px; }
.stat-card .caption { font-size: 11px; color: var(--text-muted); }

.bar-row { display: grid; grid-template-columns: 140px 1fr 90px; gap: 12px; align-items: center; margin-bottom: 8px; }
.bar-track { height: 14px; background: var(--bg); border-radius: 7px; overflow: hidden; }
.bar-fill { height: 100%; background: var(--cyan); transition: width 0.4s; }
.bar-value { text-align: right; font-family: var(--mono); color: var(--text-muted); }

.muted { color: var(--text-muted); }
.spinner { color: var(--yellow); font-family: var(--mono); }
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1><span class="logo">homeval</span> Property Valuation</h1>
      <div class="subtitle">Price estimates and market statistics from the prediction backend</div>
    </div>
    <div class="health-badges" id="health-badges"></div>
  </header>

  <nav id="nav">
    <button class="active" data-panel="predictor">Predictor</button>
    <button data-panel="market">Market</button>
  </nav>

  <div class="panel active" id="panel-predictor">
    <div class="alert" id="form-error" style="display:none"></div>
    <div class="card">
      <h2>Property Details</h2>
      <div id="form-status" class="muted"></div>
      <div class="form-grid" id="form-grid"></div>
      <div class="btn-group">
        <button class="btn primary" id="btn-submit">Estimate Price</button>
        <button class="btn" id="btn-retry" style="display:none">Retry Connection</button>
      </div>
    </div>
    <div class="card result" id="result-card" style="display:none"></div>
  </div>

  <div class="panel" id="panel-market">
    <div class="alert" id="market-error" style="display:none"></div>
    <div class="stats-grid" id="tiles"></div>
    <div class="card">
      <h2 id="bars-title">Average price per sq.ft</h2>
      <div id="bars"><span class="spinner">Loading…</span></div>
    </div>
  </div>

</div>

<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || ('HTTP ' + res.status));
  return data;
}

function inr(n) {
  if (n === undefined || n === null) return '—';
  return '₹' + Math.round(n).toLocaleString('en-IN');
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');
  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');
  if (panel === 'market') loadMarket();
});

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------
let form = null;

async function loadForm() {
  try {
    form = await api('GET', '/api/form');
  } catch (e) {
    showFormError(e.message);
    return;
  }
  renderForm();
}

function fieldInput(f, disabled) {
  const dis = disabled ? ' disabled' : '';
  if (f.name === 'location') {
    const opts = form.locations.map(l =>
      `<option${l === f.value ? ' selected' : ''}>${esc(l)}</option>`).join('');
    return `<select data-field="location"${dis}>${opts}</select>`;
  }
  if (f.name === 'bhk') {
    const opts = form.bhk_options.map(b =>
      `<option value="${b}"${String(b) === f.value ? ' selected' : ''}>${b} BHK</option>`).join('');
    return `<select data-field="bhk"${dis}>${opts}</select>`;
  }
  if (f.name === 'parking' || f.name === 'lift') {
    return `<select data-field="${f.name}"${dis}>
      <option value="true"${f.value === 'true' ? ' selected' : ''}>Yes</option>
      <option value="false"${f.value === 'false' ? ' selected' : ''}>No</option></select>`;
  }
  return `<input type="number" data-field="${f.name}" value="${esc(f.value)}"${dis}>`;
}

function renderForm() {
  const locked = !form.interactive || form.state === 'predicting';
  document.getElementById('form-grid').innerHTML = form.fields.map(f =>
    `<div><label>${esc(f.label)}</label>${fieldInput(f, locked)}</div>`).join('');

  const status = document.getElementById('form-status');
  status.innerHTML = form.state === 'loading-metadata'
    ? '<span class="spinner">Connecting to backend…</span>' : '';

  const submit = document.getElementById('btn-submit');
  submit.disabled = locked;
  submit.textContent = form.state === 'predicting' ? 'Analyzing…' : 'Estimate Price';
  document.getElementById('btn-retry').style.display =
    form.state === 'metadata-failed' ? '' : 'none';

  if (form.error) showFormError(form.error); else hideFormError();
  renderResult(form.result);
}

function renderResult(r) {
  const card = document.getElementById('result-card');
  if (!r) { card.style.display = 'none'; return; }
  const c = r.confidence_range;
  card.style.display = '';
  card.innerHTML = `
    <h2>Estimated Value · ${esc(r.location)}</h2>
    <div class="price">₹${r.predicted_price_lakhs.toFixed(2)} L</div>
    <div class="sub">${inr(r.predicted_price_inr)} · ₹${r.predicted_price_crores.toFixed(2)} Cr</div>
    <div class="range">Unit valuation <strong>${inr(r.price_per_sqft_inr)}</strong> / sq.ft</div>
    <div class="range muted">Confidence range ₹${c.lower_lakhs.toFixed(2)}L – ₹${c.upper_lakhs.toFixed(2)}L</div>`;
}

function showFormError(msg) {
  const el = document.getElementById('form-error');
  el.textContent = msg;
  el.style.display = '';
}

function hideFormError() {
  document.getElementById('form-error').style.display = 'none';
}

document.getElementById('form-grid').addEventListener('change', async e => {
  const field = e.target.dataset.field;
  if (!field) return;
  try {
    form = await api('PUT', '/api/form/field', { field, value: e.target.value });
    renderForm();
  } catch (err) {
    showFormError(err.message);
  }
});

document.getElementById('btn-submit').addEventListener('click', async () => {
  form.state = 'predicting';
  form.result = null;
  form.error = null;
  renderForm();
  try {
    form = await api('POST', '/api/form/submit');
  } catch (e) {
    await loadForm();
    showFormError(e.message);
    return;
  }
  renderForm();
});

document.getElementById('btn-retry').addEventListener('click', async () => {
  form = await api('POST', '/api/form/retry');
  renderForm();
});

// ---------------------------------------------------------------------------
// Market dashboard
// ---------------------------------------------------------------------------
async function loadMarket() {
  const err = document.getElementById('market-error');
  let d;
  try {
    d = await api('GET', '/api/dashboard');
  } catch (e) {
    err.textContent = e.message;
    err.style.display = '';
    return;
  }

  if (d.state === 'failed') {
    err.textContent = d.error;
    err.style.display = '';
    document.getElementById('tiles').innerHTML = '';
    document.getElementById('bars').innerHTML = '<span class="muted">No data</span>';
    return;
  }
  err.style.display = 'none';

  document.getElementById('tiles').innerHTML = d.tiles.map(t => `
    <div class="stat-card">
      <div class="value">${esc(t.value)}</div>
      <div class="label">${esc(t.label)}</div>
      <div class="caption">${esc(t.caption)}</div>
    </div>`).join('');

  document.getElementById('bars-title').textContent =
    'Average price per sq.ft (scale ' + inr(d.price_ceiling_sqft) + ')';
  document.getElementById('bars').innerHTML = d.rows.length === 0
    ? '<span class="muted">No per-location statistics</span>'
    : d.rows.map(r => `
      <div class="bar-row">
        <div>${esc(r.location)}</div>
        <div class="bar-track"><div class="bar-fill" style="width:${r.width_pct}%"></div></div>
        <div class="bar-value">${inr(r.avg_price_sqft)}</div>
      </div>`).join('');
}

// ---------------------------------------------------------------------------
// Health badges
// ---------------------------------------------------------------------------
async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    document.getElementById('health-badges').innerHTML = [
      badge('Backend', h.backend_ok ? 'ok' : 'err'),
      badge('Model', h.model_loaded ? 'ok' : 'warn'),
      badge('Config', h.config_exists ? 'ok' : 'warn'),
    ].join('');
  } catch (e) {
    // badges are decorative
  }
}

function badge(label, cls) {
  const dot = cls === 'ok' ? '●' : cls === 'warn' ? '○' : '✕';
  return `<span class="badge ${cls}">${dot} ${esc(label)}</span>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadHealth();
loadForm();
</script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_calls_every_form_route() {
        for route in [
            "/api/form",
            "/api/form/field",
            "/api/form/submit",
            "/api/form/retry",
            "/api/dashboard",
            "/api/health",
        ] {
            assert!(INDEX_HTML.contains(route), "missing {route}");
        }
    }
}
