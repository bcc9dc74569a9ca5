mod record;

pub use record::{
    DEFAULT_AUTHOR, DEFAULT_CATEGORY, DEFAULT_DURATION, Episode, EpisodeFields,
};
