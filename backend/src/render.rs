/// Renderer for the single upload page.
///
/// The template is compiled in and carries one `{{RESULT}}` token. POST
/// responses substitute the diagnosis markup there; GET responses (and any
/// unfilled token) render nothing in its place.
const TEMPLATE: &str = include_str!("../assets/index.html");

pub fn render_page(result: Option<&str>) -> String {
    match result {
        Some(markup) => TEMPLATE.replace(
            "{{RESULT}}",
            &format!("<div class=\"result\">{}</div>", markup),
        ),
        None => TEMPLATE.replace("{{RESULT}}", ""),
    }
}
