use anyhow::Result;
use tera::Tera;

const BUILTIN_TEMPLATES: [(&str, &str); 2] = [
    ("index.html", include_str!("../templates/index.html")),
    ("popup.html", include_str!("../templates/popup.html")),
];

pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES)?;
        tera.set_escape_fn(escape_html);
        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &tera::Context) -> Result<String> {
        self.tera.render(template_name, context).map_err(|e| {
            let loaded = self.tera.get_template_names().collect::<Vec<_>>();
            anyhow::anyhow!("Tera Render Error: {}. Requested: '{}'. Loaded: {:?}", e, template_name, loaded)
        })
    }
}

/// Escapes markup characters only; `/` stays as is so URLs and `N/A` survive.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
