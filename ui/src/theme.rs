pub const GLOBAL_CSS: &str = r#"
:root {
  --bg: #05090f;
  --bg-elev-1: #0b111a;
  --bg-elev-2: #111a26;
  --panel: #0d1520;
  --border: rgba(255, 255, 255, 0.08);
  --border-strong: rgba(255, 255, 255, 0.16);
  --text: #e6edf7;
  --text-dim: #b7c6d9;
  --text-muted: #7f8ba0;
  --accent: #5cb0ff;
  --accent-strong: #7ac6ff;
  --bar: #57c05e;
  --negative: #f0635c;
  --surface-hover: rgba(255, 255, 255, 0.05);
  --surface-active: rgba(255, 255, 255, 0.1);
  --radius: 10px;
  --space-1: 4px;
  --space-2: 8px;
  --space-3: 12px;
  --space-4: 16px;
  --font-body: "Inter", "SF Pro Text", system-ui, -apple-system, sans-serif;
  --font-mono: "JetBrains Mono", "SFMono-Regular", ui-monospace, monospace;
  --font-size-xs: 11px;
  --font-size-sm: 13px;
  --font-size-md: 15px;
  --transition: 140ms ease-out;
}

* { box-sizing: border-box; }
html, body {
  padding: 0;
  margin: 0;
  height: 100%;
  background: var(--bg);
  color: var(--text);
  font-family: var(--font-body);
  font-size: var(--font-size-sm);
}
a { color: var(--accent); text-decoration: none; }
a:hover { color: var(--accent-strong); }
button { font-family: inherit; }
input {
  font-family: inherit;
  background: var(--bg-elev-1);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 6px 10px;
}
input:focus { outline: none; border-color: var(--accent); }

.app { display: grid; grid-template-columns: 220px minmax(0, 1fr); height: 100vh; }
.sidebar { display: flex; flex-direction: column; gap: var(--space-2); padding: var(--space-3); border-right: 1px solid var(--border); background: var(--bg-elev-1); }
.nav-link { padding: var(--space-2) var(--space-3); border-radius: var(--radius); color: var(--text-dim); }
.nav-link:hover { background: var(--surface-hover); }
.nav-link.active { background: var(--surface-active); color: var(--text); }
.content { display: flex; flex-direction: column; min-width: 0; min-height: 0; }

.section-label { font-size: var(--font-size-xs); color: var(--text-muted); letter-spacing: 0.04em; text-transform: uppercase; }
.muted { color: var(--text-muted); }
.placeholder { display: flex; flex-direction: column; align-items: center; justify-content: center; gap: var(--space-2); min-height: 160px; color: var(--text-muted); font-size: var(--font-size-md); }
.status-note { color: var(--negative); font-size: var(--font-size-xs); }

.btn { border: 1px solid var(--border); background: var(--bg-elev-1); color: var(--text); padding: 6px 12px; border-radius: var(--radius); font-size: var(--font-size-sm); cursor: pointer; transition: background var(--transition), border-color var(--transition), color var(--transition); }
.btn:hover { background: var(--surface-hover); border-color: var(--border-strong); }
.btn:disabled { opacity: 0.45; cursor: default; }
.btn.ghost { background: transparent; border-style: dashed; color: var(--text-dim); }
.btn.active { border-style: solid; border-color: var(--accent); color: var(--text); }

.dashboard-shell { display: flex; flex-direction: column; flex: 1 1 auto; min-height: 0; }
.shell-header { display: flex; align-items: center; justify-content: space-between; gap: var(--space-3); padding: var(--space-3) var(--space-4); border-bottom: 1px solid var(--border); }
.breadcrumb { font-size: var(--font-size-md); font-weight: 600; white-space: nowrap; }
.toolbar { display: flex; align-items: center; gap: var(--space-2); flex-wrap: wrap; }
.range-label { font-family: var(--font-mono); font-size: var(--font-size-xs); }
.anchor-picker { display: flex; align-items: center; gap: var(--space-2); }

.panel-group { display: flex; flex: 1 1 auto; min-height: 0; padding: var(--space-3); gap: 0; }
.panel-group.horizontal { flex-direction: row; }
.panel-group.vertical { flex-direction: column; }
.panel { background: var(--panel); border: 1px solid var(--border); border-radius: var(--radius); padding: var(--space-3); overflow: auto; }
.resize-handle { flex: 0 0 8px; cursor: col-resize; touch-action: none; }
.panel-group.vertical .resize-handle { cursor: row-resize; }
.resize-handle:hover { background: var(--surface-hover); }

.process-table table { width: 100%; border-collapse: collapse; }
.process-table th { text-align: left; font-weight: 500; color: var(--text-muted); font-size: var(--font-size-xs); text-transform: uppercase; padding: var(--space-1) var(--space-2); border-bottom: 1px solid var(--border-strong); }
.process-table td { padding: var(--space-1) var(--space-2); border-bottom: 1px solid var(--border); }
.process-table .num { text-align: right; font-family: var(--font-mono); }

.poller { display: flex; flex-direction: column; gap: var(--space-3); }
.bar-graph { display: flex; flex-direction: column; gap: var(--space-2); }
.bar-chart { display: block; }
.bar-label, .bar-value, .tick-label { fill: var(--text-dim); font-size: 12px; font-family: var(--font-mono); }
.tick-label { fill: var(--text-muted); font-size: 10px; }
.grid-line { stroke: var(--border); stroke-width: 1; }
.divider { border: none; border-top: 1px solid var(--border); margin: 0; }
"#;
