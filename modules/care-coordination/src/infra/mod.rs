pub mod ratelimit;
pub mod realtime;
pub mod scheduler;
pub mod storage;
