use crate::confirm::{CANCEL_LABEL, CONFIRM_LABEL, Prompt};
use crate::models::{
    ActivitySummary, CalendarEvent, Customer, CustomerDraft, CustomerSource, EnrichedTraining, Training,
};
use crate::projection::{
    Cell, Granularity, Grid, Linked, build_grid, customer_columns, training_columns,
};
use crate::view::ViewState;
use chrono::NaiveDate;
use std::fmt::Write;

pub fn render_customers(view: &ViewState<Vec<Linked<Customer>>>) -> String {
    let mut body = String::from("<h2>Asiakkaat</h2>");
    body.push_str(&customer_form("/customers", "Lisää asiakas", &CustomerDraft::default()));
    body.push_str(&status_notice(view));
    let rows = view.data().map(Vec::as_slice).unwrap_or_default();
    body.push_str(&render_grid(&build_grid(rows, &customer_columns())));
    page("Asiakkaat", &body)
}

pub fn render_customer_edit(action: &str, draft: &CustomerDraft) -> String {
    let mut body = String::from("<h2>Muokkaa asiakasta</h2>");
    body.push_str(&customer_form(action, "Tallenna", draft));
    body.push_str(r#"<p><a href="/">Peruuta</a></p>"#);
    page("Muokkaa asiakasta", &body)
}

fn customer_form(action: &str, submit: &str, draft: &CustomerDraft) -> String {
    let fields = [
        ("firstname", "Etunimi", &draft.firstname),
        ("lastname", "Sukunimi", &draft.lastname),
        ("email", "Email", &draft.email),
        ("phone", "Puhelin", &draft.phone),
        ("streetaddress", "Osoite", &draft.streetaddress),
        ("postcode", "Postinumero", &draft.postcode),
        ("city", "Kaupunki", &draft.city),
    ];
    let mut form = format!(r#"<form class="draft" method="post" action="{}">"#, escape(action));
    for (name, label, value) in fields {
        let _ = write!(
            form,
            r#"<input name="{name}" placeholder="{label}" value="{}" />"#,
            escape(value)
        );
    }
    let _ = write!(form, r#"<button type="submit">{}</button></form>"#, escape(submit));
    form
}

pub fn render_trainings(
    trainings: &ViewState<Vec<Linked<EnrichedTraining>>>,
    customers: &[Linked<Customer>],
) -> String {
    let mut body = String::from("<h2>Harjoitukset</h2>");
    body.push_str(&training_form("/trainings", "Lisää harjoitus", None, customers));
    body.push_str(&status_notice(trainings));
    let rows = trainings.data().map(Vec::as_slice).unwrap_or_default();
    body.push_str(&render_grid(&build_grid(rows, &training_columns())));
    page("Harjoitukset", &body)
}

pub fn render_training_edit(action: &str, training: &Training, customers: &[Linked<Customer>]) -> String {
    let mut body = String::from("<h2>Muokkaa harjoitusta</h2>");
    body.push_str(&training_form(action, "Tallenna", Some(training), customers));
    body.push_str(r#"<p><a href="/trainings">Peruuta</a></p>"#);
    page("Muokkaa harjoitusta", &body)
}

fn training_form(
    action: &str,
    submit: &str,
    training: Option<&Training>,
    customers: &[Linked<Customer>],
) -> String {
    let date = training
        .and_then(Training::starts_at)
        .map(|start| start.naive_utc().format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default();
    let activity = training.map(|t| t.activity.as_str()).unwrap_or_default();
    let duration = training
        .and_then(Training::minutes)
        .map(|minutes| minutes.to_string())
        .unwrap_or_default();
    let selected = training.and_then(selected_customer_link);

    let mut form = format!(r#"<form class="draft" method="post" action="{}">"#, escape(action));
    let _ = write!(
        form,
        r#"<input type="datetime-local" name="date" value="{}" />"#,
        escape(&date)
    );
    let _ = write!(
        form,
        r#"<input name="activity" placeholder="Aktiviteetti" value="{}" />"#,
        escape(activity)
    );
    let _ = write!(
        form,
        r#"<input name="duration" placeholder="Kesto (min)" value="{}" />"#,
        escape(&duration)
    );
    form.push_str(r#"<select name="customer"><option value="">Valitse asiakas</option>"#);
    for customer in customers {
        let Some(link) = customer.link.as_deref() else {
            continue;
        };
        let mark = if selected.as_deref() == Some(link) { " selected" } else { "" };
        let name = customer.record.display_name().unwrap_or_default();
        let _ = write!(
            form,
            r#"<option value="{}"{mark}>{}</option>"#,
            escape(link),
            escape(&name)
        );
    }
    let _ = write!(form, r#"</select><button type="submit">{}</button></form>"#, escape(submit));
    form
}

fn selected_customer_link(training: &Training) -> Option<String> {
    match training.customer_source() {
        CustomerSource::Embedded(customer) => customer.links.self_href().map(str::to_string),
        CustomerSource::Link(link) => Some(link.to_string()),
        CustomerSource::Missing => None,
    }
}

pub fn render_confirm(prompt: Prompt, action: &str, link: &str, back: &str) -> String {
    let body = format!(
        r#"<div class="confirm"><h2>{title}</h2><p>{message}</p>
<form method="post" action="{action}">
<input type="hidden" name="link" value="{link}" />
<button type="submit" name="choice" value="confirm">{yes}</button>
<button type="submit" name="choice" value="cancel" class="secondary">{no}</button>
</form>
<p><a href="{back}">Takaisin</a></p></div>"#,
        title = escape(prompt.title),
        message = escape(prompt.message),
        action = escape(action),
        link = escape(link),
        yes = CONFIRM_LABEL,
        no = CANCEL_LABEL,
        back = escape(back),
    );
    page(prompt.title, &body)
}

pub fn render_calendar(
    view: &ViewState<Vec<CalendarEvent>>,
    visible: &[CalendarEvent],
    granularity: Granularity,
    anchor: NaiveDate,
) -> String {
    let mut body = String::from("<h2>Harjoitukset kalenterissa</h2>");
    let (first, last) = granularity.window(anchor);

    body.push_str(r#"<div class="toolbar">"#);
    let nav = [
        ("Edellinen", granularity, granularity.shift(anchor, -1)),
        ("Tänään", granularity, chrono::Local::now().date_naive()),
        ("Seuraava", granularity, granularity.shift(anchor, 1)),
        ("Kuukausi", Granularity::Month, anchor),
        ("Viikko", Granularity::Week, anchor),
        ("Päivä", Granularity::Day, anchor),
    ];
    for (label, target, date) in nav {
        let _ = write!(
            body,
            r#"<a class="tab" href="/calendar?view={}&amp;date={}">{label}</a>"#,
            target.as_str(),
            date.format("%Y-%m-%d")
        );
    }
    let _ = write!(
        body,
        r#"</div><p class="subtitle">{} – {}</p>"#,
        first.format("%d.%m.%Y"),
        last.format("%d.%m.%Y")
    );
    body.push_str(&status_notice(view));

    if visible.is_empty() {
        body.push_str(r#"<p class="hint">Ei harjoituksia tällä aikavälillä.</p>"#);
    }
    let mut current_day = None;
    for event in visible {
        let day = event.start.date_naive();
        if current_day != Some(day) {
            if current_day.is_some() {
                body.push_str("</ul>");
            }
            let _ = write!(body, r#"<h3>{}</h3><ul class="events">"#, day.format("%d.%m.%Y"));
            current_day = Some(day);
        }
        let _ = write!(
            body,
            "<li><time>{}–{}</time> {}</li>",
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            escape(&event.title)
        );
    }
    if current_day.is_some() {
        body.push_str("</ul>");
    }
    page("Kalenteri", &body)
}

pub fn render_statistics(view: &ViewState<Vec<ActivitySummary>>) -> String {
    let mut body = String::from("<h2>Harjoitustyyppien kestot (min)</h2>");
    body.push_str(&status_notice(view));
    let series = view.data().map(Vec::as_slice).unwrap_or_default();
    body.push_str(r#"<div class="chart-card">"#);
    body.push_str(&bar_chart(series));
    body.push_str(r#"<p class="legend"><span class="swatch"></span>Kesto (min)</p></div>"#);
    page("Tilastot", &body)
}

fn bar_chart(series: &[ActivitySummary]) -> String {
    const WIDTH: i64 = 720;
    const HEIGHT: i64 = 320;
    const PAD: i64 = 40;

    let mut svg = format!(
        r#"<svg id="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Kesto (min)">"#
    );
    let max = series.iter().map(|s| s.duration).max().unwrap_or(0).max(1);
    let plot_height = HEIGHT - 2 * PAD;
    let slot = if series.is_empty() {
        0
    } else {
        (WIDTH - 2 * PAD) / series.len() as i64
    };

    for step in 0..=4 {
        let y = PAD + plot_height * step / 4;
        let value = max - max * step / 4;
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PAD}" y1="{y}" x2="{}" y2="{y}" /><text class="chart-label" x="4" y="{y}">{value}</text>"#,
            WIDTH - PAD
        );
    }

    for (index, point) in series.iter().enumerate() {
        let height = plot_height * point.duration.max(0) / max;
        let x = PAD + slot * index as i64 + slot / 8;
        let y = HEIGHT - PAD - height;
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{x}" y="{y}" width="{}" height="{height}"><title>{}: {}</title></rect><text class="chart-label" x="{}" y="{}">{}</text>"#,
            slot * 3 / 4,
            escape(&point.activity),
            point.duration,
            x,
            HEIGHT - PAD / 3,
            escape(&point.activity)
        );
    }
    svg.push_str("</svg>");
    svg
}

fn render_grid(grid: &Grid) -> String {
    let mut html = String::from(r#"<table class="grid"><thead><tr>"#);
    for header in &grid.headers {
        let _ = write!(html, "<th>{}</th>", escape(header));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &grid.rows {
        html.push_str("<tr>");
        for (cell, field) in row.iter().zip(&grid.fields) {
            match cell {
                Cell::Text(text) => {
                    let _ = write!(html, r#"<td data-field="{field}">{}</td>"#, escape(text));
                }
                Cell::Link { href, label } => {
                    let _ = write!(
                        html,
                        r#"<td data-field="{field}"><a class="action" href="{}">{label}</a></td>"#,
                        escape(href)
                    );
                }
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn status_notice<T>(view: &ViewState<T>) -> String {
    match view {
        ViewState::Idle | ViewState::Loading => r#"<p class="status">Ladataan…</p>"#.to_string(),
        ViewState::Ready(_) => String::new(),
        ViewState::Failed(_) => {
            r#"<p class="status" data-type="error">Tietojen haku epäonnistui.</p>"#.to_string()
        }
    }
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{BODY}}", body)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="fi">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Personal Trainer</title>
  <style>
    :root {
      --bg-1: #f3f6f4;
      --ink: #22302b;
      --accent: #2f7d5b;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 18px 40px rgba(47, 72, 88, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #e4efe9 60%, #f6f8f7 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    nav ul {
      list-style: none;
      display: flex;
      gap: 8px;
      padding: 0;
      margin: 0 auto 20px;
      max-width: 1100px;
    }

    nav a, .tab {
      display: inline-block;
      padding: 8px 14px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.08);
      color: var(--accent-2);
      font-weight: 600;
      text-decoration: none;
    }

    main {
      max-width: 1100px;
      margin: 0 auto;
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    form.draft {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-bottom: 16px;
    }

    input, select {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    button.secondary {
      background: var(--accent-2);
    }

    table.grid {
      width: 100%;
      border-collapse: collapse;
    }

    table.grid th, table.grid td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.1);
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-bar, .swatch {
      fill: #8884d8;
      background: #8884d8;
    }

    .swatch {
      display: inline-block;
      width: 12px;
      height: 12px;
      margin-right: 6px;
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }
  </style>
</head>
<body>
  <nav>
    <ul>
      <li><a href="/">Asiakkaat</a></li>
      <li><a href="/trainings">Harjoitukset</a></li>
      <li><a href="/calendar">Kalenteri</a></li>
      <li><a href="/statistics">Tilastot</a></li>
    </ul>
  </nav>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b>"A" & 'B'</b>"#), "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;");
    }

    #[test]
    fn failed_view_renders_an_empty_table() {
        let html = render_customers(&ViewState::Failed("HTTP 500".into()));
        assert!(html.contains("Tietojen haku epäonnistui."));
        assert!(html.contains("<th>Etunimi</th>"));
        assert!(!html.contains("<td"));
    }

    #[test]
    fn confirmation_page_offers_both_choices() {
        let html = render_confirm(
            Prompt::DELETE_CUSTOMER,
            "/customers/delete",
            "https://api.example/api/customers/1",
            "/",
        );
        assert!(html.contains("Haluatko varmasti poistaa asiakkaan?"));
        assert!(html.contains(r#"value="confirm">Kyllä</button>"#));
        assert!(html.contains(r#"value="cancel" class="secondary">Peruuta</button>"#));
        assert!(html.contains(r#"value="https://api.example/api/customers/1""#));
    }

    #[test]
    fn statistics_chart_has_one_bar_per_activity() {
        let html = render_statistics(&ViewState::Ready(vec![
            ActivitySummary { activity: "Run".into(), duration: 50 },
            ActivitySummary { activity: "Gym".into(), duration: 25 },
        ]));
        assert_eq!(html.matches(r#"class="chart-bar""#).count(), 2);
        assert!(html.contains("<title>Run: 50</title>"));
    }
}
