use crate::domain::PageId;
use serde::Deserialize;

pub const NEW_PAGE_ID: PageId = -1;

pub const EMPTY_PAGE_MARKDOWN: &str = "# A new page\n\nFeel-free to write in Markdown!\n";

#[derive(Deserialize, Debug)]
pub struct SaveForm {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(rename = "newPage", default)]
    pub new_page: String,
}

impl SaveForm {
    pub fn is_new_page(&self) -> bool {
        self.new_page == "yes"
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteForm {
    pub id: String,
}

// everything the page template needs
pub struct PageView {
    pub title: String,
    pub id: PageId,
    pub new_page: bool,
    pub raw_content: String,
    pub html_content: String,
    pub timestamp: String,
}
