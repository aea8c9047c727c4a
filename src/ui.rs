use crate::models::{Collectible, DailyCount, HistoryEntry, PacingResponse, Priority, Task};
use crate::pacing::{Advisory, PacingOutcome};
use crate::state::Dashboard;
use std::fmt::Write;

const RECENT_ROWS: usize = 10;

pub fn render_index(data: &Dashboard, pacing: &PacingResponse) -> String {
    INDEX_HTML
        .replace("{{PACING}}", &render_pacing(pacing))
        .replace("{{CURRENT}}", &pacing.current.to_string())
        .replace("{{TARGET}}", &pacing.target.to_string())
        .replace("{{TARGET_DATE}}", &pacing.target_date.to_string())
        .replace("{{TASKS}}", &render_tasks(data.checklist.tasks()))
        .replace("{{KOKORO}}", &render_kokoro(data.kokoro.rows()))
        .replace("{{CHART}}", &render_chart(&data.history.daily_done_counts()))
        .replace("{{RECENT}}", &render_recent(&data.history.recent_done(RECENT_ROWS)))
}

fn render_pacing(pacing: &PacingResponse) -> String {
    let tone = match pacing.outcome {
        PacingOutcome::DeadlinePassed { .. } => "error",
        PacingOutcome::GoalReached => "ok",
        PacingOutcome::OnTrack { advisory, .. } => match advisory {
            Advisory::Hard => "warn",
            Advisory::Moderate => "info",
            Advisory::Easy => "ok",
        },
    };
    let mut html = String::new();
    if let PacingOutcome::OnTrack {
        days_remaining,
        remaining,
        per_day,
        ..
    } = pacing.outcome
    {
        let _ = write!(
            html,
            r#"<div class="panel">
        <div class="stat"><span class="label">Days left</span><span class="value">{days_remaining}</span></div>
        <div class="stat"><span class="label">Per day</span><span class="value net">{per_day:.1}</span></div>
        <div class="stat"><span class="label">Remaining</span><span class="value">{remaining}</span></div>
      </div>"#
        );
    }
    let _ = write!(
        html,
        r#"<p class="status" data-type="{tone}">{}</p>"#,
        escape_html(&pacing.message)
    );
    html
}

fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return r#"<li class="hint">No tasks yet.</li>"#.to_string();
    }
    let mut html = String::new();
    for (index, task) in tasks.iter().enumerate() {
        let checked = if task.done { " checked" } else { "" };
        let class = if task.done { "task done" } else { "task" };
        let _ = write!(
            html,
            r#"<li class="{class}">
          <label><input type="checkbox" data-toggle="{index}"{checked} /> <span>{}</span></label>
          <button class="ghost" type="button" data-remove-task="{index}">Remove</button>
        </li>"#,
            escape_html(&task.name)
        );
    }
    html
}

fn render_kokoro(rows: &[Collectible]) -> String {
    let mut html = String::new();
    for (index, row) in rows.iter().enumerate() {
        let mut options = String::new();
        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            let selected = if priority == row.priority { " selected" } else { "" };
            let _ = write!(options, r#"<option value="{priority}"{selected}>{priority}</option>"#);
        }
        let status = if row.completed { "✔" } else { "" };
        let _ = write!(
            html,
            r#"<tr data-row="{index}">
            <td><input name="name" value="{}" /></td>
            <td><select name="priority">{options}</select></td>
            <td><input name="target_count" type="number" min="0" value="{}" /></td>
            <td><input name="held_count" type="number" min="0" value="{}" /></td>
            <td class="completed">{status}</td>
            <td><button class="ghost" type="button" data-remove-kokoro="{index}">Remove</button></td>
          </tr>"#,
            escape_html(&row.name),
            row.target_count,
            row.held_count,
        );
    }
    html
}

/// Bar chart of done entries per day, as inline SVG.
fn render_chart(series: &[DailyCount]) -> String {
    if series.is_empty() {
        return r#"<text class="chart-label" x="50%" y="50%" text-anchor="middle">No history yet</text>"#
            .to_string();
    }

    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 260.0;
    const PAD_X: f64 = 36.0;
    const PAD_Y: f64 = 34.0;
    const TOP: f64 = 20.0;

    let max = series.iter().map(|point| point.count).max().unwrap_or(1).max(1) as f64;
    let slot = (WIDTH - PAD_X * 2.0) / series.len() as f64;
    let bar = (slot * 0.6).min(48.0);
    let label_every = if series.len() > 10 { series.len() / 10 + 1 } else { 1 };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<line class="chart-axis" x1="{PAD_X}" y1="{y}" x2="{x2}" y2="{y}" />"#,
        y = HEIGHT - PAD_Y,
        x2 = WIDTH - PAD_X
    );
    for (index, point) in series.iter().enumerate() {
        let height = (HEIGHT - PAD_Y - TOP) * point.count as f64 / max;
        let x = PAD_X + slot * index as f64 + (slot - bar) / 2.0;
        let y = HEIGHT - PAD_Y - height;
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{x:.1}" y="{y:.1}" width="{bar:.1}" height="{height:.1}"><title>{} : {}</title></rect>"#,
            point.date, point.count
        );
        if index % label_every == 0 {
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x + bar / 2.0,
                HEIGHT - PAD_Y + 18.0,
                point.date.format("%m-%d")
            );
        }
    }
    svg
}

fn render_recent(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return r#"<tr><td colspan="2" class="hint">Nothing completed yet.</td></tr>"#.to_string();
    }
    let mut html = String::new();
    for entry in entries {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            entry.date,
            escape_html(&entry.task_name)
        );
    }
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>DQW Progress Manager</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #c9dbef;
      --ink: #22272e;
      --accent: #e0822c;
      --accent-2: #2a4d75;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(42, 77, 117, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3ecf6 60%, #f4f7fb 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle, .hint {
      margin: 0;
      color: #5f646b;
      font-size: 0.95rem;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(42, 77, 117, 0.08);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #5b6470;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(42, 77, 117, 0.12);
    }

    .pane { display: none; }
    .pane.active { display: grid; gap: 16px; }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 16px;
      border: 1px solid rgba(42, 77, 117, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8a8f96;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.net { color: var(--accent); }

    form.inline, .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: end;
    }

    input, select {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(42, 77, 117, 0.2);
      background: white;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    button.ghost {
      background: transparent;
      color: var(--accent-2);
      padding: 6px 10px;
    }

    ul.tasks {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .task {
      display: flex;
      justify-content: space-between;
      align-items: center;
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
    }

    .task.done span {
      text-decoration: line-through;
      color: #8a8f96;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 14px;
      overflow: hidden;
    }

    th, td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid rgba(42, 77, 117, 0.08);
    }

    td input { width: 100%; }
    td.completed { color: #2d7a4b; font-weight: 600; }

    #chart {
      width: 100%;
      height: 260px;
      background: white;
      border-radius: 20px;
    }

    .chart-bar { fill: var(--accent); }
    .chart-axis { stroke: rgba(42, 77, 117, 0.25); }
    .chart-label { fill: #7a7f86; font-size: 11px; }

    .status { min-height: 1.2em; }
    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="warn"] { color: #b9770e; }
    .status[data-type="info"] { color: var(--accent-2); }
    .status[data-type="ok"] { color: #2d7a4b; }

    @media (max-width: 600px) {
      .app { padding: 28px 20px; }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>DQW Progress Manager</h1>
      <p class="subtitle">Daily tasks, leveling pace and kokoro targets in one place.</p>
    </header>

    <nav class="tabs" role="tablist">
      <button class="tab active" type="button" data-tab="daily">Daily</button>
      <button class="tab" type="button" data-tab="pacing">Leveling</button>
      <button class="tab" type="button" data-tab="kokoro">Kokoro</button>
      <button class="tab" type="button" data-tab="history">History</button>
      <button class="tab" type="button" data-tab="import">Import</button>
    </nav>

    <section class="pane active" id="pane-daily">
      <h2>Daily checklist</h2>
      <ul class="tasks">{{TASKS}}</ul>
      <form class="inline" id="task-form">
        <input name="name" placeholder="New task" required />
        <button type="submit">Add</button>
        <button class="ghost" type="button" id="reset-tasks">Reset for today</button>
        <a class="hint" href="/api/export/tasks.csv">Download CSV</a>
      </form>
    </section>

    <section class="pane" id="pane-pacing">
      <h2>Leveling pace</h2>
      <form class="inline" id="pacing-form">
        <label>Current EXP (10k)<br /><input name="current" type="number" min="0" value="{{CURRENT}}" /></label>
        <label>Target EXP (10k)<br /><input name="target" type="number" min="0" value="{{TARGET}}" /></label>
        <label>Target date<br /><input name="target_date" type="date" value="{{TARGET_DATE}}" /></label>
        <button type="submit">Calculate</button>
      </form>
      <div id="pacing-result">{{PACING}}</div>
    </section>

    <section class="pane" id="pane-kokoro">
      <h2>Kokoro targets</h2>
      <table id="kokoro-grid">
        <thead>
          <tr><th>Name</th><th>Priority</th><th>Target</th><th>Held</th><th>Done</th><th></th></tr>
        </thead>
        <tbody>{{KOKORO}}</tbody>
      </table>
      <div class="row">
        <button type="button" id="kokoro-add-row">Add row</button>
        <button type="button" id="kokoro-save">Save grid</button>
        <a class="hint" href="/api/export/kokoro.csv">Download CSV</a>
      </div>
    </section>

    <section class="pane" id="pane-history">
      <h2>Completed tasks per day</h2>
      <svg id="chart" viewBox="0 0 600 260" role="img" aria-label="History chart">{{CHART}}</svg>
      <table>
        <thead><tr><th>Date</th><th>Task</th></tr></thead>
        <tbody>{{RECENT}}</tbody>
      </table>
      <a class="hint" href="/api/export/history.csv">Download CSV</a>
    </section>

    <section class="pane" id="pane-import">
      <h2>Import from a web page</h2>
      <form class="inline" id="preview-form">
        <input name="url" type="url" placeholder="https://..." size="48" required />
        <button type="submit">Preview tables</button>
      </form>
      <div id="preview"></div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const tabs = Array.from(document.querySelectorAll('.tab'));
    const showTab = (name) => {
      tabs.forEach((tab) => tab.classList.toggle('active', tab.dataset.tab === name));
      document.querySelectorAll('.pane').forEach((pane) => {
        pane.classList.toggle('active', pane.id === `pane-${name}`);
      });
      history.replaceState(null, '', `#${name}`);
    };
    tabs.forEach((tab) => tab.addEventListener('click', () => showTab(tab.dataset.tab)));
    if (location.hash) {
      showTab(location.hash.slice(1));
    }

    const send = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body === undefined ? {} : { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const thenReload = (promise) =>
      promise.then(() => location.reload()).catch((err) => setStatus(err.message, 'error'));

    document.getElementById('task-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const name = new FormData(event.target).get('name');
      thenReload(send('POST', '/api/tasks', { name }));
    });
    document.getElementById('reset-tasks').addEventListener('click', () => {
      thenReload(send('POST', '/api/tasks/reset'));
    });
    document.querySelectorAll('[data-toggle]').forEach((box) => {
      box.addEventListener('change', () => thenReload(send('POST', `/api/tasks/${box.dataset.toggle}/toggle`)));
    });
    document.querySelectorAll('[data-remove-task]').forEach((button) => {
      button.addEventListener('click', () => thenReload(send('DELETE', `/api/tasks/${button.dataset.removeTask}`)));
    });

    document.getElementById('pacing-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const params = new URLSearchParams(new FormData(event.target));
      try {
        const result = await send('GET', `/api/pacing?${params}`);
        const el = document.getElementById('pacing-result');
        el.textContent = result.message;
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    const grid = document.querySelector('#kokoro-grid tbody');
    document.getElementById('kokoro-add-row').addEventListener('click', () => {
      const row = document.createElement('tr');
      row.innerHTML = `
        <td><input name="name" /></td>
        <td><select name="priority"><option>high</option><option selected>medium</option><option>low</option></select></td>
        <td><input name="target_count" type="number" min="0" value="2" /></td>
        <td><input name="held_count" type="number" min="0" value="0" /></td>
        <td class="completed"></td><td></td>`;
      grid.appendChild(row);
    });
    document.getElementById('kokoro-save').addEventListener('click', () => {
      const rows = Array.from(grid.querySelectorAll('tr'))
        .map((tr) => ({
          name: tr.querySelector('[name=name]').value.trim(),
          priority: tr.querySelector('[name=priority]').value,
          target_count: Number(tr.querySelector('[name=target_count]').value || 0),
          held_count: Number(tr.querySelector('[name=held_count]').value || 0)
        }))
        .filter((row) => row.name);
      send('PUT', '/api/kokoro', rows)
        .then((result) => (result.changed ? location.reload() : setStatus('No changes', 'info')))
        .catch((err) => setStatus(err.message, 'error'));
    });
    document.querySelectorAll('[data-remove-kokoro]').forEach((button) => {
      button.addEventListener('click', () => thenReload(send('DELETE', `/api/kokoro/${button.dataset.removeKokoro}`)));
    });

    const previewEl = document.getElementById('preview');
    const cell = (text, tag) => {
      const el = document.createElement(tag);
      el.textContent = text;
      return el;
    };
    document.getElementById('preview-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const url = new FormData(event.target).get('url');
      setStatus('Fetching...', 'info');
      try {
        const tables = await send('POST', '/api/import/preview', { url });
        previewEl.replaceChildren();
        if (!tables.length) {
          setStatus('No tables found on that page.', 'warn');
          return;
        }
        setStatus(`${tables.length} table(s) found`, 'ok');
        tables.forEach((table, index) => {
          const wrap = document.createElement('div');
          const grid = document.createElement('table');
          if (table.header.length) {
            const head = document.createElement('tr');
            table.header.forEach((text) => head.appendChild(cell(text, 'th')));
            grid.appendChild(head);
          }
          table.rows.slice(0, 5).forEach((row) => {
            const tr = document.createElement('tr');
            row.forEach((text) => tr.appendChild(cell(text, 'td')));
            grid.appendChild(tr);
          });
          const button = cell(`Import first column of table ${index + 1}`, 'button');
          button.addEventListener('click', () =>
            send('POST', '/api/import', { table_index: index })
              .then((result) => setStatus(`${result.added} kokoro added`, 'ok'))
              .catch((err) => setStatus(err.message, 'error'))
          );
          wrap.append(grid, button);
          previewEl.appendChild(wrap);
        });
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });
  </script>
</body>
</html>
"#;
