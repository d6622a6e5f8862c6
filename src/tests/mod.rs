mod support;

mod unit_config;
mod unit_sqlite_page_store;
