/// Longest candidate slot, in base slots.
pub const MAX_DURATION_BLOCKS: u32 = 32;

/// Widest date range a weekly series may cover (about one academic year).
pub const MAX_SERIES_DAYS: i64 = 400;

/// Longest purpose/owner label accepted from a reservation dump.
pub const MAX_LABEL_LEN: usize = 1024;

/// Capacity of the notice broadcast channel.
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;
