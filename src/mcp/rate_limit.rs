//! MCP Rate Limiting
//!
//! Per-connection rate limiting for MCP tool calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::registry::ToolCategory;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub read_per_minute: u32,
    pub write_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            read_per_minute: 120,
            write_per_minute: 30,
        }
    }
}

/// Tracks rate limit state for a single connection
#[derive(Debug)]
struct ConnectionRateLimitState {
    read_count: u32,
    write_count: u32,
    window_start: Instant,
}

impl ConnectionRateLimitState {
    fn new() -> Self {
        Self {
            read_count: 0,
            write_count: 0,
            window_start: Instant::now(),
        }
    }

    fn reset_if_expired(&mut self) {
        if self.window_start.elapsed() > Duration::from_secs(60) {
            self.read_count = 0;
            self.write_count = 0;
            self.window_start = Instant::now();
        }
    }
}

/// Rate limiter for MCP requests
pub struct McpRateLimiter {
    config: RateLimitConfig,
    states: Mutex<HashMap<u64, ConnectionRateLimitState>>,
}

impl McpRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Check if a request is allowed and record it if so
    /// Returns Ok(()) if allowed, Err(retry_after_secs) if rate limited
    pub fn check_and_record(&self, connection_id: u64, category: ToolCategory) -> Result<(), u32> {
        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(connection_id)
            .or_insert_with(ConnectionRateLimitState::new);

        // Reset window if expired
        state.reset_if_expired();

        let (current, limit) = match category {
            ToolCategory::Read => (&mut state.read_count, self.config.read_per_minute),
            ToolCategory::Write => (&mut state.write_count, self.config.write_per_minute),
        };

        if *current >= limit {
            // Calculate retry-after based on window expiry
            let elapsed = state.window_start.elapsed().as_secs();
            let retry_after = 60u64.saturating_sub(elapsed) as u32;
            return Err(retry_after.max(1));
        }

        *current += 1;
        Ok(())
    }

    /// Drop state for a closed connection.
    pub fn forget(&self, connection_id: u64) {
        self.states.lock().unwrap().remove(&connection_id);
    }
}

impl Default for McpRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
