use log::{Level, log};

/// Caller-visible side channel of diagnostic messages.
///
/// Messages are kept only when the buffer is enabled (the generator's
/// `verbose` flag) and are forwarded to the `log` facade in every case.
/// Nothing in the engine ever reads them back.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
	enabled: bool,
	messages: Vec<String>,
}

impl LogBuffer {
	pub fn new(enabled: bool) -> Self {
		Self { enabled, messages: Vec::new() }
	}

	/// Records a message at the given level.
	pub fn push(&mut self, level: Level, message: String) {
		log!(level, "{message}");
		if self.enabled {
			self.messages.push(message);
		}
	}

	pub fn info(&mut self, message: String) {
		self.push(Level::Info, message);
	}

	pub fn debug(&mut self, message: String) {
		self.push(Level::Debug, message);
	}

	pub fn warn(&mut self, message: String) {
		self.push(Level::Warn, message);
	}

	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	pub fn clear(&mut self) {
		self.messages.clear();
	}
}
