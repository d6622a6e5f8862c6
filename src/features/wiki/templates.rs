use crate::features::wiki::model::PageView;
use crate::parser::markdown::{escape_html, wiki_path};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
<header><a href="/">Wiki home</a></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

pub fn render_index(pages: &[String]) -> String {
    let mut body = String::from(
        r#"<h1>Wiki home</h1>
<form action="/create" method="post">
  <input type="text" name="name" placeholder="New page name">
  <button type="submit">Create</button>
</form>
"#,
    );

    if pages.is_empty() {
        body.push_str("<p>The wiki is currently empty!</p>\n");
    } else {
        body.push_str("<ul>\n");
        for page in pages {
            body.push_str(&format!(
                "  <li><a href=\"{}\">{}</a></li>\n",
                escape_html(&wiki_path(page)),
                escape_html(page)
            ));
        }
        body.push_str("</ul>\n");
    }

    layout("Wiki home", &body)
}

pub fn render_page(view: &PageView) -> String {
    let title = escape_html(&view.title);
    let new_page = if view.new_page { "yes" } else { "no" };

    let mut body = format!(
        r#"<h1>{title}</h1>
<article>
{html}
</article>
<form action="/save" method="post">
  <input type="hidden" name="id" value="{id}">
  <input type="hidden" name="title" value="{title}">
  <input type="hidden" name="newPage" value="{new_page}">
  <textarea name="markdown" rows="15" cols="80">{raw}</textarea>
  <button type="submit">Save</button>
</form>
"#,
        title = title,
        html = view.html_content,
        id = view.id,
        new_page = new_page,
        raw = escape_html(&view.raw_content),
    );

    if !view.new_page {
        body.push_str(&format!(
            r#"<form action="/delete" method="post">
  <input type="hidden" name="id" value="{}">
  <button type="submit">Delete</button>
</form>
"#,
            view.id
        ));
    }

    body.push_str(&format!(
        "<footer>Rendered {}</footer>\n",
        escape_html(&view.timestamp)
    ));

    layout(&view.title, &body)
}
