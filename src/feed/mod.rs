mod render;

pub use render::{FEED_CONTENT_TYPE, FEED_LANGUAGE, render_feed};
