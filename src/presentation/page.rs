// Server-rendered calculator page
use crate::application::session_repository::FormSession;
use crate::domain::field::FieldKind;
use crate::domain::form::{FormController, Phase};
use crate::domain::format::format_grouped;
use crate::domain::horsepower::CalculationResult;
use std::fmt::Write;

const FALLBACK_HOST: &str = "trap-hp";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#111;color:#eee}\
header,footer{padding:1rem 2rem;background:#1b1b1b}\
main{max-width:40rem;margin:2rem auto;padding:0 1rem}\
section{background:#1e1e1e;border-radius:.5rem;padding:1.5rem;margin-bottom:1.5rem}\
label{display:block;margin-top:1rem;font-weight:600}\
input{width:100%;font-size:1.1rem;padding:.4rem;box-sizing:border-box}\
input.invalid{border:2px solid #e5484d}\
.error{color:#e5484d;font-size:.9rem;margin:.3rem 0 0}\
.formula{font-family:monospace}\
.horsepower{font-size:4rem;font-weight:700;text-align:center;margin:.5rem 0}\
.tag{display:inline-block;border:1px solid #555;border-radius:1rem;padding:.1rem .6rem;font-size:.75rem}";

const SCRIPT: &str = r#"
const form = document.getElementById("calculator");
const submit = document.getElementById("calculate");
async function post(url, value) {
  const body = new URLSearchParams();
  if (value !== undefined) body.set("value", value);
  const res = await fetch(url, { method: "POST", body });
  if (!res.ok) return;
  const state = await res.json();
  const input = document.getElementById(state.field);
  const error = document.getElementById(state.field + "-error");
  error.textContent = state.error || "";
  error.hidden = !state.error;
  input.classList.toggle("invalid", !!state.error);
  submit.disabled = !state.canCalculate;
}
for (const input of form.querySelectorAll("input[type=number]")) {
  const url = form.dataset.session + "/fields/" + input.id;
  input.addEventListener("input", () => post(url, input.value));
  input.addEventListener("blur", () => post(url + "/blur"));
}
form.addEventListener("submit", () => {
  submit.disabled = true;
  submit.textContent = "Calculating...";
});
"#;

/// Footer details taken from the request.
#[derive(Debug, Clone)]
pub struct Footer {
    pub year: i32,
    pub host: Option<String>,
}

impl Footer {
    /// Attribution link carrying the page's host name, URL-encoded.
    pub fn attribution_url(&self) -> String {
        let host = self
            .host
            .as_deref()
            .map(strip_port)
            .filter(|host| !host.is_empty())
            .unwrap_or(FALLBACK_HOST);
        format!(
            "https://caffeine.ai/?utm_source=Caffeine-footer&utm_medium=referral&utm_content={}",
            urlencoding::encode(host)
        )
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal, e.g. [::1]:8080
        return host.split_once(']').map_or(host, |(addr, _)| &host[..addr.len() + 1]);
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

pub fn render_page(session: &FormSession, footer: &Footer) -> String {
    let form = &session.form;
    let session_path = format!("/sessions/{}", session.id);

    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>Trap HP</title><style>{STYLE}</style></head><body>\
         <header><h1>Trap HP</h1><p>Quarter-Mile Horsepower Calculator</p></header><main>"
    );

    html.push_str(&render_calculator(form, &session_path));
    if let Some(result) = form.result() {
        html.push_str(&render_result(result));
    }

    let _ = write!(
        html,
        "</main><footer><p>&copy; {year} Trap HP. All rights reserved.</p>\
         <p>Built with &hearts; using <a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">caffeine.ai</a></p>\
         </footer><script>{SCRIPT}</script></body></html>",
        year = footer.year,
        url = escape_html(&footer.attribution_url()),
    );
    html
}

fn render_calculator(form: &FormController, session_path: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<section><h2>Calculate Horsepower</h2>\
         <p>Estimate your vehicle's horsepower based on weight and quarter-mile trap speed</p>\
         <p class=\"formula\"><strong>Formula:</strong> HP = weight &times; (trap_speed / 234)&sup3;</p>\
         <form id=\"calculator\" method=\"post\" action=\"{session_path}/calculate\" data-session=\"{session_path}\">"
    );

    for kind in FieldKind::ALL {
        html.push_str(&render_field(form, kind));
    }

    let calculating = form.phase() == Phase::Calculating;
    let disabled = if form.can_calculate() { "" } else { " disabled" };
    let label = if calculating { "Calculating..." } else { "Calculate HP" };
    let _ = write!(
        html,
        "<p><button id=\"calculate\" type=\"submit\"{disabled}>{label}</button></p></form>"
    );

    if form.result().is_some() {
        let _ = write!(
            html,
            "<form method=\"post\" action=\"{session_path}/reset\">\
             <button id=\"reset\" type=\"submit\">Reset</button></form>"
        );
    }

    html.push_str("</section>");
    html
}

fn render_field(form: &FormController, kind: FieldKind) -> String {
    let field = form.field(kind);
    let id = kind.id();
    let (class, error) = match &field.error {
        Some(err) => (" class=\"invalid\"", escape_html(&err.to_string())),
        None => ("", String::new()),
    };
    let hidden = if field.error.is_some() { "" } else { " hidden" };

    format!(
        "<label for=\"{id}\">{title} <small>({unit})</small></label>\
         <input id=\"{id}\" name=\"{id}\" type=\"number\"{class} placeholder=\"{placeholder}\" \
         value=\"{value}\" min=\"{min}\" max=\"{max}\" step=\"{step}\">\
         <p id=\"{id}-error\" class=\"error\"{hidden}>{error}</p>",
        title = kind.title(),
        unit = kind.unit(),
        placeholder = kind.placeholder(),
        value = escape_html(&field.value),
        min = kind.min(),
        max = kind.max(),
        step = kind.step(),
    )
}

fn render_result(result: &CalculationResult) -> String {
    format!(
        "<section id=\"result\"><h2>Estimated Horsepower</h2>\
         <p>Based on your vehicle specifications</p>\
         <p class=\"horsepower\">{horsepower}</p><p>Horsepower (HP)</p>\
         <p>Weight: <strong>{weight}</strong> lb</p>\
         <p>Trap Speed: <strong>{trap_speed}</strong> mph</p>\
         <p><strong>Disclaimer:</strong> This is an estimated horsepower calculation based on \
         quarter-mile trap speed. Real-world results may vary due to factors such as altitude, \
         temperature, traction, driver skill, and vehicle setup. For accurate measurements, use \
         a dynamometer.</p>\
         <p><span class=\"tag\">Quarter-Mile</span> <span class=\"tag\">Estimated</span> \
         <span class=\"tag\">Formula-Based</span></p></section>",
        horsepower = format_grouped(result.horsepower as f64),
        weight = format_grouped(result.weight),
        trap_speed = format_grouped(result.trap_speed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::horsepower::estimate;

    fn footer() -> Footer {
        Footer {
            year: 2026,
            host: Some("trap-hp.example.com:8080".to_string()),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_attribution_url() {
        assert!(footer().attribution_url().ends_with("utm_content=trap-hp.example.com"));

        let fallback = Footer { year: 2026, host: None };
        assert!(fallback.attribution_url().ends_with("utm_content=trap-hp"));

        let ipv6 = Footer {
            year: 2026,
            host: Some("[::1]:8080".to_string()),
        };
        assert!(ipv6.attribution_url().ends_with("utm_content=%5B%3A%3A1%5D"));
    }

    #[test]
    fn test_empty_form() {
        let session = FormSession::new();
        let html = render_page(&session, &footer());

        assert!(html.contains("<button id=\"calculate\" type=\"submit\" disabled>Calculate HP</button>"));
        assert!(!html.contains("id=\"result\""));
        assert!(!html.contains("id=\"reset\""));
        assert!(html.contains("&copy; 2026 Trap HP"));
        assert!(html.contains(&format!("action=\"/sessions/{}/calculate\"", session.id)));
    }

    #[test]
    fn test_inline_errors_and_escaped_values() {
        let mut session = FormSession::new();
        session.form.edit(FieldKind::Weight, "<b>");
        let html = render_page(&session, &footer());

        assert!(html.contains("value=\"&lt;b&gt;\""));
        assert!(html.contains("<p id=\"weight-error\" class=\"error\">Weight must be a valid number</p>"));
        assert!(html.contains("<p id=\"trapSpeed-error\" class=\"error\" hidden></p>"));
    }

    #[test]
    fn test_result_panel() {
        let mut session = FormSession::new();
        session.form.edit(FieldKind::Weight, "12500");
        session.form.edit(FieldKind::TrapSpeed, "180.5");
        let inputs = session.form.begin_calculation().unwrap();
        session.form.complete_calculation(inputs);
        let html = render_page(&session, &footer());

        let expected = estimate(12_500.0, 180.5).horsepower as f64;
        assert!(html.contains(&format!("<p class=\"horsepower\">{}</p>", format_grouped(expected))));
        assert!(html.contains("<strong>12,500</strong> lb"));
        assert!(html.contains("<strong>180.5</strong> mph"));
        assert!(html.contains("id=\"reset\""));
    }
}
