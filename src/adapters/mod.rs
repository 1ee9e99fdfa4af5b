//! Port implementations: live network adapters plus cassette recording and replay.

pub mod live;
pub mod recording;
pub mod replaying;
