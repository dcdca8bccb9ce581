pub mod news_page;
