// Socket and stream buffer sizes
pub(crate) const TCP_READ_BUFFER_SIZE: usize = 16 * 1024; // 16KB
pub(crate) const TCP_WRITE_BUFFER_SIZE: usize = 8 * 1024 * 1024; // 8MB
// Connection establishment
pub(crate) const TCP_CONNECT_TIMEOUT: u64 = 30;
// Keep alive
pub(crate) const TCP_KEEP_ALIVE_SECS: u64 = 60;
pub(crate) const TCP_KEEP_ALIVE_INTERVAL: u64 = 10;
pub(crate) const TCP_KEEP_ALIVE_RETRIES: u32 = 6;
