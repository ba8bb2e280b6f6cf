//! HTML building blocks. Every interpolated string goes through [`escape`].

use crate::format::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "error" => NoticeKind::Error,
            "success" | "ok" => NoticeKind::Success,
            _ => NoticeKind::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

/// A transient message shown as a toast on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Customers,
    Vehicles,
    Services,
    Sessions,
}

const NAV_ITEMS: [(Nav, &str, &str); 5] = [
    (Nav::Dashboard, "/", "Dashboard"),
    (Nav::Customers, "/customers", "Customers"),
    (Nav::Vehicles, "/vehicles", "Vehicles"),
    (Nav::Services, "/services", "Services"),
    (Nav::Sessions, "/sessions", "Photo sessions"),
];

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes a query value for redirect locations.
pub fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn layout(title: &str, active: Nav, notice: Option<&Notice>, body: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(item, href, label)| {
            let class = if *item == active { " class=\"active\"" } else { "" };
            format!("<a href=\"{href}\"{class}>{label}</a>")
        })
        .collect();

    LAYOUT_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{NAV}}", &nav)
        .replace("{{TOAST}}", &notice.map(toast).unwrap_or_default())
        .replace("{{BODY}}", body)
}

pub fn toast(notice: &Notice) -> String {
    format!(
        "<div class=\"toast\" data-kind=\"{}\" role=\"status\">{}</div>",
        notice.kind.as_str(),
        escape(&notice.message)
    )
}

pub fn spinner(label: &str) -> String {
    format!(
        "<span class=\"spinner\" hidden aria-live=\"polite\"><span class=\"spinner-dot\"></span>{}</span>",
        escape(label)
    )
}

/// Returns the generated element id with the markup so callers can wire a
/// `data-open-modal` trigger to it.
pub fn modal(title: &str, body: &str) -> (String, String) {
    let id = generate_id("modal");
    let html = format!(
        r#"<dialog class="modal" id="{id}">
  <header><h3>{}</h3><button type="button" class="link" data-close-modal>Close</button></header>
  <div class="modal-body">{body}</div>
</dialog>"#,
        escape(title)
    );
    (id, html)
}

pub fn modal_trigger(modal_id: &str, label: &str, class: &str) -> String {
    format!(
        "<button type=\"button\" class=\"{class}\" data-open-modal=\"{}\">{}</button>",
        escape(modal_id),
        escape(label)
    )
}

pub fn card(title: &str, body: &str) -> String {
    format!(
        "<section class=\"card\"><h2>{}</h2>{body}</section>",
        escape(title)
    )
}

pub fn stat_card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"stat\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>",
        escape(label),
        escape(value)
    )
}

pub fn progress_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    format!(
        "<div class=\"progress\" role=\"progressbar\" aria-valuenow=\"{clamped:.0}\" aria-valuemin=\"0\" aria-valuemax=\"100\"><div class=\"progress-fill\" style=\"width: {clamped:.1}%\"></div><span>{clamped:.0}%</span></div>"
    )
}

pub fn badge(text: &str, tone: &str) -> String {
    format!(
        "<span class=\"badge badge-{}\">{}</span>",
        escape(tone),
        escape(text)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
}

impl InputKind {
    fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Tel => "tel",
            InputKind::Number => "number",
            InputKind::Date => "date",
        }
    }
}

pub fn input_field(
    kind: InputKind,
    name: &str,
    label: &str,
    value: &str,
    required: bool,
) -> String {
    let required = if required { " required" } else { "" };
    let step = if kind == InputKind::Number { " step=\"any\"" } else { "" };
    format!(
        "<label class=\"field\"><span>{}</span><input type=\"{}\" name=\"{}\" value=\"{}\"{step}{required}></label>",
        escape(label),
        kind.as_str(),
        escape(name),
        escape(value)
    )
}

pub fn text_field(name: &str, label: &str, value: &str, required: bool) -> String {
    input_field(InputKind::Text, name, label, value, required)
}

pub fn textarea_field(name: &str, label: &str, value: &str) -> String {
    format!(
        "<label class=\"field\"><span>{}</span><textarea name=\"{}\" rows=\"3\">{}</textarea></label>",
        escape(label),
        escape(name),
        escape(value)
    )
}

/// `options` are `(value, label)` pairs; `selected` matches on value.
pub fn select_field(
    name: &str,
    label: &str,
    options: &[(String, String)],
    selected: Option<&str>,
    required: bool,
) -> String {
    let required = if required { " required" } else { "" };
    let options: String = options
        .iter()
        .map(|(value, text)| {
            let mark = if Some(value.as_str()) == selected { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{mark}>{}</option>",
                escape(value),
                escape(text)
            )
        })
        .collect();
    format!(
        "<label class=\"field\"><span>{}</span><select name=\"{}\"{required}><option value=\"\">Select…</option>{options}</select></label>",
        escape(label),
        escape(name)
    )
}

/// Submit buttons are disabled by the layout script while the POST is in flight.
pub fn form(action: &str, fields: &str, submit_label: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" class=\"form\" data-submit-once>{fields}<div class=\"form-actions\"><button type=\"submit\" class=\"btn\">{}</button>{}</div></form>",
        escape(action),
        escape(submit_label),
        spinner("Saving…")
    )
}

pub fn inline_post_button(action: &str, label: &str, confirm: Option<&str>) -> String {
    let confirm = confirm
        .map(|text| format!(" data-confirm=\"{}\"", escape(text)))
        .unwrap_or_default();
    format!(
        "<form method=\"post\" action=\"{}\" class=\"inline\" data-submit-once{confirm}><button type=\"submit\" class=\"link\">{}</button></form>",
        escape(action),
        escape(label)
    )
}

/// Cells are inserted as-is; callers escape text content.
pub fn table(headers: &[&str], rows: &[Vec<String>], empty_message: &str) -> String {
    if rows.is_empty() {
        return format!("<p class=\"empty\">{}</p>", escape(empty_message));
    }

    let head: String = headers
        .iter()
        .map(|header| format!("<th>{}</th>", escape(header)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|cell| format!("<td>{cell}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!("<table class=\"table\"><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

pub fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Garage POS</title>
  <style>
    :root {
      --bg: #f4f1ec;
      --ink: #24231f;
      --muted: #6f6a62;
      --accent: #d9534f;
      --accent-2: #2f4858;
      --ok: #2d7a4b;
      --card: #ffffff;
      --line: rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    nav {
      display: flex;
      gap: 18px;
      padding: 14px 28px;
      background: var(--accent-2);
    }

    nav a {
      color: rgba(255, 255, 255, 0.75);
      text-decoration: none;
      font-weight: 600;
    }

    nav a.active {
      color: white;
      border-bottom: 2px solid var(--accent);
    }

    main {
      width: min(1080px, 100%);
      margin: 0 auto;
      padding: 28px 20px 60px;
      display: grid;
      gap: 22px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 22px;
      border: 1px solid var(--line);
    }

    .card h2 {
      margin-top: 0;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 14px;
    }

    .stat {
      background: var(--card);
      border-radius: 14px;
      padding: 16px;
      border: 1px solid var(--line);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .table {
      width: 100%;
      border-collapse: collapse;
    }

    .table th,
    .table td {
      text-align: left;
      padding: 8px 10px;
      border-bottom: 1px solid var(--line);
    }

    .form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 14px;
    }

    .field {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
    }

    .field input,
    .field select,
    .field textarea {
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid var(--line);
      font: inherit;
    }

    .form-actions {
      grid-column: 1 / -1;
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .btn {
      border: none;
      border-radius: 999px;
      padding: 10px 20px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }

    .btn:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .link {
      background: none;
      border: none;
      color: var(--accent-2);
      cursor: pointer;
      padding: 0;
      font: inherit;
      text-decoration: underline;
    }

    form.inline {
      display: inline;
    }

    .badge {
      padding: 2px 10px;
      border-radius: 999px;
      font-size: 0.8rem;
      background: var(--line);
    }

    .badge-closed {
      background: #e2e2e2;
    }

    .badge-done {
      background: #d4efdf;
      color: var(--ok);
    }

    .badge-missing {
      background: #fbe3e2;
      color: var(--accent);
    }

    .progress {
      position: relative;
      height: 22px;
      border-radius: 999px;
      background: var(--line);
      overflow: hidden;
    }

    .progress-fill {
      height: 100%;
      background: var(--ok);
    }

    .progress span {
      position: absolute;
      inset: 0;
      text-align: center;
      font-size: 0.8rem;
      line-height: 22px;
    }

    .spinner-dot {
      display: inline-block;
      width: 12px;
      height: 12px;
      margin-right: 6px;
      border-radius: 50%;
      border: 2px solid var(--line);
      border-top-color: var(--accent);
      animation: spin 700ms linear infinite;
    }

    .toast {
      position: fixed;
      right: 20px;
      bottom: 20px;
      padding: 12px 18px;
      border-radius: 12px;
      background: var(--accent-2);
      color: white;
      transition: opacity 400ms ease;
    }

    .toast[data-kind="error"] {
      background: var(--accent);
    }

    .toast[data-kind="success"] {
      background: var(--ok);
    }

    .toast.fade {
      opacity: 0;
    }

    .modal {
      border: none;
      border-radius: 16px;
      width: min(560px, 92vw);
    }

    .modal header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .empty,
    .hint {
      color: var(--muted);
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  <nav>{{NAV}}</nav>
  <main>
{{BODY}}
  </main>
  {{TOAST}}
  <script>
    document.querySelectorAll('form[data-submit-once]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        const question = form.dataset.confirm;
        if (question && !window.confirm(question)) {
          event.preventDefault();
          return;
        }
        form.querySelectorAll('button[type="submit"]').forEach((button) => {
          button.disabled = true;
        });
        const spinner = form.querySelector('.spinner');
        if (spinner) {
          spinner.hidden = false;
        }
      });
    });

    document.querySelectorAll('[data-open-modal]').forEach((button) => {
      button.addEventListener('click', () => {
        const dialog = document.getElementById(button.dataset.openModal);
        if (dialog) {
          dialog.showModal();
        }
      });
    });

    document.querySelectorAll('[data-close-modal]').forEach((button) => {
      button.addEventListener('click', () => button.closest('dialog').close());
    });

    const debounce = (fn, wait) => {
      let timer = null;
      return (...args) => {
        clearTimeout(timer);
        timer = setTimeout(() => fn(...args), wait);
      };
    };

    document.querySelectorAll('input[data-search]').forEach((input) => {
      const rows = Array.from(document.querySelectorAll(input.dataset.search));
      input.addEventListener('input', debounce(() => {
        const needle = input.value.trim().toLowerCase();
        rows.forEach((row) => {
          row.hidden = needle !== '' && !row.textContent.toLowerCase().includes(needle);
        });
      }, 250));
    });

    const toast = document.querySelector('.toast');
    if (toast) {
      setTimeout(() => toast.classList.add('fade'), 3000);
      setTimeout(() => toast.remove(), 3600);
      const url = new URL(window.location.href);
      url.searchParams.delete('notice');
      url.searchParams.delete('kind');
      window.history.replaceState(null, '', url);
    }
  </script>
</body>
</html>
"#;
