//! Store de cache en memoria
//!
//! Implementa el mismo contrato que Redis (TTL, borrado por glob) dentro del
//! proceso. Se usa en tests y en local cuando no hay Redis. Permite simular un
//! backend caído con `set_available(false)`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::operations::{CacheError, CacheOperations, CacheResult, CacheStats, DeleteBudget};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    available: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Simular caída (false) o recuperación (true) del backend
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Claves vivas, ordenadas
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub async fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map_or(false, |entry| !entry.is_expired(Instant::now()))
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("memory store marked unavailable".to_string()))
        }
    }
}

#[async_trait]
impl CacheOperations for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_available()?;
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.check_available()?;
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds.max(1)),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        self.check_available()?;
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.duration_since(now).as_secs()))
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.check_available()?;
        let removed = self.entries.write().await.remove(key);
        Ok(removed.map_or(0, |_| 1))
    }

    async fn delete_pattern(&self, pattern: &str, budget: &DeleteBudget) -> CacheResult<u64> {
        self.check_available()?;
        let matcher = glob_to_regex(pattern)?;

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        let deleted = (before - entries.len()) as u64;
        budget.record(deleted);

        debug!(pattern = pattern, deleted = deleted, "🗑️ Borrado por patrón en memoria");
        Ok(deleted)
    }

    async fn flush_all(&self) -> CacheResult<u64> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        let count = entries.len() as u64;
        entries.clear();
        Ok(count)
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        self.check_available()?;
        let now = Instant::now();
        let entries = self.entries.read().await;

        let live = entries.values().filter(|entry| !entry.is_expired(now));
        let (key_count, memory_bytes) = live.fold((0u64, 0u64), |(count, bytes), entry| {
            (count + 1, bytes + entry.value.len() as u64)
        });

        let stats = CacheStats {
            connected: true,
            key_count,
            memory_bytes,
            memory_human: format!("{}B", memory_bytes),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            connected_clients: 1,
            ..Default::default()
        };

        Ok(stats.with_hit_rate())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check_available()
    }
}

/// Convertir un glob estilo Redis en regex anclada.
///
/// Soporta `*`, `?`, clases `[abc]`, `[^abc]`, rangos `[a-z]` y `\` para
/// escapar el carácter siguiente. Una clase sin cerrar es un patrón inválido.
fn glob_to_regex(pattern: &str) -> CacheResult<Regex> {
    let invalid = |reason: &str| CacheError::InvalidPattern(format!("{}: {}", pattern, reason));

    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("(?s)^");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => regex.push_str(&literal(escaped)),
                None => regex.push_str(&literal('\\')),
            },
            '[' => {
                let negated = chars.next_if_eq(&'^').is_some();
                let mut items = String::new();
                let mut closed = false;

                while let Some(c) = chars.next() {
                    let start = match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => chars.next().ok_or_else(|| invalid("unterminated class"))?,
                        other => other,
                    };

                    let is_range = chars.peek() == Some(&'-')
                        && chars.clone().nth(1).map_or(false, |next| next != ']');
                    if is_range {
                        chars.next();
                        let end = match chars.next() {
                            Some('\\') => chars.next().ok_or_else(|| invalid("unterminated class"))?,
                            Some(end) => end,
                            None => return Err(invalid("unterminated class")),
                        };
                        // Redis acepta rangos invertidos
                        let (low, high) = if start <= end { (start, end) } else { (end, start) };
                        items.push_str(&format!("{}-{}", class_char(low), class_char(high)));
                    } else {
                        items.push_str(&class_char(start));
                    }
                }

                if !closed {
                    return Err(invalid("unterminated class"));
                }
                match (items.is_empty(), negated) {
                    (true, false) => regex.push_str("[^\\x{0}-\\x{10FFFF}]"),
                    (true, true) => regex.push('.'),
                    (false, false) => regex.push_str(&format!("[{}]", items)),
                    (false, true) => regex.push_str(&format!("[^{}]", items)),
                }
            }
            other => regex.push_str(&literal(other)),
        }
    }
    regex.push('$');

    Regex::new(&regex).map_err(|e| invalid(&e.to_string()))
}

fn literal(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

fn class_char(c: char) -> String {
    format!("\\x{{{:X}}}", c as u32)
}
