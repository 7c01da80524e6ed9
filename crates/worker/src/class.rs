/// Execution classes used to label spawned work in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// User-initiated work whose result the caller is waiting on (saves).
	Interactive,
	/// Best-effort work whose failure is only logged (background refresh).
	Background,
	/// Repeating work driven by a caller-selected interval.
	Polling,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::Polling => "polling",
		}
	}
}
