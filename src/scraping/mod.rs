pub mod array_scraper;
