use pulldown_cmark::{Event, Options as CmarkOptions, Parser, Tag, html};

// compiles a page's markdown into HTML, sending bare links to other wiki pages
pub fn render_markdown(markdown_content: &str) -> String {
    compile_markdown_to_html(markdown_content, resolve_wiki_link)
}

// compiles markdown content into HTML, and resolves links on-the-fly using the provided resolver
pub fn compile_markdown_to_html<F>(markdown_content: &str, mut resolver: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut options = CmarkOptions::empty();
    options.insert(CmarkOptions::ENABLE_STRIKETHROUGH);
    options.insert(CmarkOptions::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown_content, options);

    let mut html_content = String::new();

    let event_iterator = parser.map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: resolver(&dest_url).into(),
            title,
            id,
        }),
        // raw html in a page would be rendered verbatim otherwise
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    html::push_html(&mut html_content, event_iterator);

    html_content
}

// "Other Page" -> "/wiki/Other Page"; anything with a scheme, an absolute path or an anchor
// is left alone
pub fn resolve_wiki_link(link: &str) -> String {
    let is_external = link.is_empty()
        || link.starts_with('/')
        || link.starts_with('#')
        || link.starts_with("mailto:")
        || link.contains("://");

    if is_external {
        link.to_string()
    } else {
        wiki_path(link.trim_end_matches(".md"))
    }
}

/// Path of the page called `name`, percent-encoded so that names holding
/// `?`, `#`, `/` or `%` still address exactly that page.
pub fn wiki_path(name: &str) -> String {
    let mut path = String::from("/wiki/");
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                path.push(byte as char)
            }
            _ => path.push_str(&format!("%{:02X}", byte)),
        }
    }
    path
}

/// Escapes text for inclusion in HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
