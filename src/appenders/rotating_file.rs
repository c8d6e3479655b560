//! Rotating file writer
//!
//! The default destination behind dispatch rules. The rotation strategy comes
//! from the rule-set name, rotated files are numbered (`app.log.1`, `app.log.2`,
//! ...) and optionally gzipped, and a maintenance thread handles periodic flushes
//! and re-creates the file if something removed it.

use crate::core::error::{LoggerError, Result};
use crate::core::writer::{report_error, ErrorCallback, WriteHandle, WriterOptions};
use chrono::{DateTime, Local, Timelike};
use crossbeam_channel::{never, select, tick, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

/// Rotation strategy defining when to rotate log files
///
/// # Examples
///
/// ```
/// use logit::appenders::RotationStrategy;
/// use std::time::Duration;
///
/// assert_eq!(RotationStrategy::from_rule_name("1hour").unwrap(), RotationStrategy::Hourly);
/// assert_eq!(
///     RotationStrategy::from_rule_name("15min").unwrap(),
///     RotationStrategy::Time { interval: Duration::from_secs(900) }
/// );
/// assert!(RotationStrategy::from_rule_name("service").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RotationStrategy {
    /// Rotate when file exceeds size in bytes
    Size { max_bytes: u64 },

    /// Rotate at time interval
    Time { interval: Duration },

    /// Rotate daily at specified hour (0-23)
    Daily { hour: u8 },

    /// Rotate hourly
    Hourly,

    /// No rotation (useful for testing or when external rotation is used)
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Hourly
    }
}

impl RotationStrategy {
    /// Parse a rule-set name.
    ///
    /// Accepted: `never`/`none`, `hourly`/`1hour`, `daily`/`1day`,
    /// `<n>min`, `<n>hour`, `<n>day` and `size:<bytes>`.
    pub fn from_rule_name(name: &str) -> Result<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "never" | "none" => return Ok(RotationStrategy::Never),
            "hourly" | "1hour" => return Ok(RotationStrategy::Hourly),
            "daily" | "1day" => return Ok(RotationStrategy::Daily { hour: 0 }),
            _ => {}
        }

        let invalid = || LoggerError::config("RotationStrategy", format!("unknown rotation rule '{}'", name));

        if let Some(bytes) = lowered.strip_prefix("size:") {
            let max_bytes: u64 = bytes.parse().map_err(|_| invalid())?;
            if max_bytes == 0 {
                return Err(invalid());
            }
            return Ok(RotationStrategy::Size { max_bytes });
        }

        let split = lowered
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(lowered.len());
        let (count, unit) = lowered.split_at(split);
        let count: u64 = count.parse().map_err(|_| invalid())?;
        let unit_secs = match unit {
            "min" => 60,
            "hour" => 3600,
            "day" => 24 * 3600,
            _ => return Err(invalid()),
        };
        if count == 0 {
            return Err(invalid());
        }
        Ok(RotationStrategy::Time {
            interval: Duration::from_secs(count * unit_secs),
        })
    }
}

/// Configuration for rotating file writer
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// Rotation strategy defining when to rotate
    pub strategy: RotationStrategy,
    /// Maximum number of rotated files to keep
    pub max_backup_files: usize,
    /// Rotated files last modified longer ago than this are deleted
    pub max_age: Option<Duration>,
    /// Whether to compress rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: 5,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Option<Duration>) -> Self {
        self.max_age = age;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Open file plus rotation bookkeeping, guarded by the writer's mutex
struct FileState {
    base_path: PathBuf,
    policy: RotationPolicy,
    buffer_size: usize,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Timestamp of the last rotation (used for time-based strategies)
    last_rotation: SystemTime,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
    closed: bool,
}

impl FileState {
    fn open(base_path: PathBuf, policy: RotationPolicy, buffer_size: usize) -> Result<Self> {
        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = Self::open_file(&base_path)?;
        Ok(Self {
            base_path,
            policy,
            buffer_size,
            writer: Some(BufWriter::with_capacity(buffer_size, file)),
            current_size,
            last_rotation,
            deletion_failure_count: 0,
            closed: false,
        })
    }

    fn open_file(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::io_operation(
                "open log file",
                format!("Cannot access metadata of '{}'", path.display()),
                e,
            )
        })?;
        let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, metadata.len(), last_rotation))
    }

    fn display_path(&self) -> String {
        self.base_path.display().to_string()
    }

    fn should_rotate(&self) -> bool {
        let elapsed = || {
            SystemTime::now()
                .duration_since(self.last_rotation)
                .unwrap_or(Duration::ZERO)
        };

        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => self.current_size >= *max_bytes,
            RotationStrategy::Time { interval } => elapsed() >= *interval,
            RotationStrategy::Hourly => {
                let now: DateTime<Local> = SystemTime::now().into();
                let last: DateTime<Local> = self.last_rotation.into();
                elapsed() >= Duration::from_secs(3600)
                    || now.date_naive() != last.date_naive()
                    || now.hour() != last.hour()
            }
            RotationStrategy::Daily { hour } => {
                let now: DateTime<Local> = SystemTime::now().into();
                let last: DateTime<Local> = self.last_rotation.into();
                now.date_naive() != last.date_naive() && now.hour() >= u32::from(*hour)
            }
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.base_path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn gz_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.display_path(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        const MAX_DELETION_FAILURES: usize = 5;
        let max = self.policy.max_backup_files.max(1);

        let oldest = self.backup_path(max);
        let mut deletion_failed = false;
        for candidate in [Self::gz_path(&oldest), oldest] {
            if candidate.exists() {
                if let Err(e) = fs::remove_file(&candidate) {
                    deletion_failed = true;
                    eprintln!(
                        "[WARN] Failed to remove oldest backup {}: {} (failure #{}/{})",
                        candidate.display(),
                        e,
                        self.deletion_failure_count + 1,
                        MAX_DELETION_FAILURES
                    );
                }
            }
        }

        if deletion_failed {
            self.deletion_failure_count += 1;
            if self.deletion_failure_count >= MAX_DELETION_FAILURES {
                return Err(LoggerError::file_rotation(
                    self.display_path(),
                    format!(
                        "Rotation aborted: failed to delete old backup files {} consecutive times",
                        self.deletion_failure_count
                    ),
                ));
            }
        } else {
            self.deletion_failure_count = 0;
        }

        for i in (1..max).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let old_gz = Self::gz_path(&old_path);

            let (from, to) = if old_gz.exists() {
                (old_gz, Self::gz_path(&new_path))
            } else if old_path.exists() {
                (old_path, new_path)
            } else {
                continue;
            };

            if fs::rename(&from, &to).is_err() {
                // Some platforms refuse to rename over an existing file
                let _ = fs::remove_file(&to);
                fs::rename(&from, &to).map_err(|e| {
                    LoggerError::file_rotation(
                        from.display().to_string(),
                        format!("Failed to rotate backup files: {}", e),
                    )
                })?;
            }
        }

        let first_backup = self.backup_path(1);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &first_backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.display_path(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                Self::compress_file(&first_backup)?;
            }
        }
        self.remove_expired_backups();

        let (file, size, _) = Self::open_file(&self.base_path)?;
        self.writer = Some(BufWriter::with_capacity(self.buffer_size, file));
        self.current_size = size;
        self.last_rotation = SystemTime::now();
        Ok(())
    }

    /// Delete numbered backups, plain or gzipped, older than `max_age`
    fn remove_expired_backups(&self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let now = SystemTime::now();

        for index in 1..=self.policy.max_backup_files.max(1) {
            let plain = self.backup_path(index);
            for candidate in [Self::gz_path(&plain), plain] {
                let expired = fs::metadata(&candidate)
                    .and_then(|m| m.modified())
                    .map(|modified| now.duration_since(modified).unwrap_or(Duration::ZERO) > max_age)
                    .unwrap_or(false);
                if expired {
                    if let Err(e) = fs::remove_file(&candidate) {
                        eprintln!(
                            "[WARN] Failed to remove expired backup {}: {}",
                            candidate.display(),
                            e
                        );
                    }
                }
            }
        }
    }

    /// Gzip `path` next to itself; the original is removed only once the
    /// compressed file is complete.
    fn compress_file(path: &Path) -> Result<()> {
        use std::io::{copy, BufReader};

        let gz_path = Self::gz_path(path);
        let mut temp_name = gz_path.as_os_str().to_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let compress = || -> std::io::Result<()> {
            let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
            let output = BufWriter::with_capacity(64 * 1024, File::create(&temp_path)?);
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            copy(&mut reader, &mut encoder)?;
            encoder.finish()?.flush()?;
            fs::rename(&temp_path, &gz_path)
        };

        if let Err(e) = compress() {
            let _ = fs::remove_file(&temp_path);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress '{}'", path.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[WARN] Compression succeeded but failed to remove original file {}: {}",
                path.display(),
                e
            );
        }
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(LoggerError::writer(format!("'{}' is closed", self.display_path())));
        }

        if self.should_rotate() {
            if let Err(e) = self.rotate() {
                // Keep writing to whatever file we can open rather than lose records
                if self.writer.is_none() {
                    let (file, size, last_rotation) = Self::open_file(&self.base_path)?;
                    self.writer = Some(BufWriter::with_capacity(self.buffer_size, file));
                    self.current_size = size;
                    self.last_rotation = last_rotation;
                }
                self.last_rotation = SystemTime::now();
                self.current_size = 0;
                return self.write_bytes(buf).and(Err(e));
            }
        }

        self.write_bytes(buf)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        let path = self.display_path();
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer(format!("'{}' has no open file", path)))?;
        writer.write_all(buf).map_err(|e| {
            LoggerError::io_operation("write log entry", format!("Failed to write '{}'", path), e)
        })?;
        self.current_size += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|e| {
                LoggerError::io_operation(
                    "flush log file",
                    format!("Failed to flush '{}'", self.base_path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Re-create the file if it disappeared from under us
    fn ensure_exists(&mut self) -> Result<()> {
        if self.closed || self.base_path.exists() {
            return Ok(());
        }

        if let Some(mut stale) = self.writer.take() {
            // Bytes buffered for the unlinked file are lost either way
            let _ = stale.flush();
        }
        let (file, size, _) = Self::open_file(&self.base_path)?;
        self.writer = Some(BufWriter::with_capacity(self.buffer_size, file));
        self.current_size = size;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.flush();
        self.writer = None;
        result
    }
}

/// Background flush / existence-check thread
struct Maintenance {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Maintenance {
    fn spawn(
        state: Arc<Mutex<FileState>>,
        flush_interval: Option<Duration>,
        check_interval: Option<Duration>,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        let (stop, stopped) = unbounded::<()>();
        let handle = thread::spawn(move || {
            Self::run(&state, &stopped, flush_interval, check_interval, on_error.as_ref());
        });
        Self { stop, handle }
    }

    fn run(
        state: &Mutex<FileState>,
        stopped: &Receiver<()>,
        flush_interval: Option<Duration>,
        check_interval: Option<Duration>,
        on_error: Option<&ErrorCallback>,
    ) {
        let flush_tick = flush_interval.map(tick).unwrap_or_else(never);
        let check_tick = check_interval.map(tick).unwrap_or_else(never);

        loop {
            select! {
                recv(stopped) -> _ => break,
                recv(flush_tick) -> _ => {
                    if let Err(e) = state.lock().flush() {
                        report_error(on_error, &e);
                    }
                }
                recv(check_tick) -> _ => {
                    if let Err(e) = state.lock().ensure_exists() {
                        report_error(on_error, &e);
                    }
                }
            }
        }
    }

    fn stop(self) {
        drop(self.stop);
        if self.handle.join().is_err() {
            eprintln!("[LOGGER ERROR] Writer maintenance thread panicked");
        }
    }
}

/// File destination with rotation, shared by every rule that targets it
///
/// # Examples
///
/// ```no_run
/// use logit::appenders::RotatingFileWriter;
/// use logit::{WriteHandle, WriterOptions};
///
/// let writer = RotatingFileWriter::from_options("daily", "/var/log/app.log", &WriterOptions::new())
///     .unwrap();
/// writer.write_all(b"{\"msg\":\"started\"}\n").unwrap();
/// writer.close().unwrap();
/// ```
pub struct RotatingFileWriter {
    destination: String,
    state: Arc<Mutex<FileState>>,
    maintenance: Mutex<Option<Maintenance>>,
}

impl RotatingFileWriter {
    /// Open `path` with an explicit rotation policy and no maintenance thread
    pub fn with_policy(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        let destination = base_path.display().to_string();
        let state = FileState::open(base_path, policy, crate::core::writer::DEFAULT_BUFFER_SIZE)?;
        Ok(Self {
            destination,
            state: Arc::new(Mutex::new(state)),
            maintenance: Mutex::new(None),
        })
    }

    /// Open `destination` the way the default writer factory does: rotation
    /// from `rule_set_name`, retention, buffering and maintenance from `options`
    pub fn from_options(rule_set_name: &str, destination: &str, options: &WriterOptions) -> Result<Self> {
        let policy = RotationPolicy::new()
            .with_strategy(RotationStrategy::from_rule_name(rule_set_name)?)
            .with_max_backups(options.max_files)
            .with_max_age(options.max_age)
            .with_compression(options.compress);

        let buffer_size = options.buffer_size.max(1);
        let state = Arc::new(Mutex::new(FileState::open(
            PathBuf::from(destination),
            policy,
            buffer_size,
        )?));

        let maintenance = (options.flush_interval.is_some() || options.check_interval.is_some())
            .then(|| {
                Maintenance::spawn(
                    Arc::clone(&state),
                    options.flush_interval,
                    options.check_interval,
                    options.on_error.clone(),
                )
            });

        Ok(Self {
            destination: destination.to_string(),
            state,
            maintenance: Mutex::new(maintenance),
        })
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    #[must_use]
    pub fn strategy(&self) -> RotationStrategy {
        self.state.lock().policy.strategy.clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl WriteHandle for RotatingFileWriter {
    fn write_all(&self, buf: &[u8]) -> Result<()> {
        self.state.lock().write(buf)
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().flush()
    }

    fn close(&self) -> Result<()> {
        if let Some(maintenance) = self.maintenance.lock().take() {
            maintenance.stop();
        }
        self.state.lock().close()
    }

    fn destination(&self) -> &str {
        &self.destination
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        // Best effort flush - ignore errors during drop
        let _ = self.close();
    }
}
