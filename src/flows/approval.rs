//! Out-of-band user approval.
//!
//! The handshake hands the authorize URL to an [`ApprovalPort`] and awaits its answer
//! before exchanging the request token. [`ConsoleApproval`] prompts on the terminal;
//! [`ChannelApproval`] lets a non-interactive host (a web callback, a chat bot) deliver the
//! decision from elsewhere.

// std
use std::{
	io::{self, BufRead, BufReader, Write},
	thread,
};
// crates.io
use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
// self
use crate::_prelude::*;

/// Boxed future returned by [`ApprovalPort::await_approval`].
pub type ApprovalFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Approval, ApprovalError>> + 'a + Send>>;

/// Positive answer from the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Approval {
	/// Verification code shown by Jira, forwarded as `oauth_verifier` when present.
	pub verifier: Option<String>,
}
impl Approval {
	/// Approval without a verification code.
	pub fn granted() -> Self {
		Self::default()
	}

	/// Approval carrying the verification code displayed by Jira.
	pub fn with_verifier(verifier: impl Into<String>) -> Self {
		Self { verifier: Some(verifier.into()) }
	}
}

/// Reasons an approval did not arrive.
#[derive(Debug, ThisError)]
pub enum ApprovalError {
	/// The user declined.
	#[error("User declined the authorization request.")]
	Denied,
	/// The approval channel closed before a decision was delivered.
	#[error("Approval channel closed before a decision was made.")]
	Abandoned,
	/// Prompt IO failed.
	#[error("Approval prompt failed.")]
	Io(#[from] io::Error),
}

/// Synchronous external-approval port.
///
/// The coordinator awaits the returned future (under its approval timeout) and does not
/// continue until it resolves.
pub trait ApprovalPort
where
	Self: Send + Sync,
{
	/// Presents `authorize_url` to the user and resolves once they have answered.
	fn await_approval<'a>(&'a self, authorize_url: &'a Url) -> ApprovalFuture<'a>;
}

/// Terminal prompt: prints the URL and waits for a line on stdin.
///
/// An empty line (or `y`) approves, `n` declines, anything else is taken as the
/// verification code. The line is read on a detached OS thread, so an approval that times
/// out leaves the read behind without holding up runtime shutdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleApproval;
impl ApprovalPort for ConsoleApproval {
	fn await_approval<'a>(&'a self, authorize_url: &'a Url) -> ApprovalFuture<'a> {
		let prompt = format!(
			"Open {authorize_url} in a browser and allow access.\n\
			 Press Enter when done (paste the verification code if Jira shows one, or type `n` to cancel): "
		);

		Box::pin(prompt_for_answer(prompt, io::stdout(), BufReader::new(io::stdin())))
	}
}

/// Writes `prompt` to `output` and reads one line from `input` on a dedicated thread.
///
/// Blocking reads must stay off tokio's blocking pool, which is drained on runtime
/// shutdown. End of input counts as abandonment.
async fn prompt_for_answer<W, R>(
	prompt: String,
	mut output: W,
	mut input: R,
) -> Result<Approval, ApprovalError>
where
	W: 'static + Send + Write,
	R: 'static + Send + BufRead,
{
	let (sender, receiver) = oneshot::channel();

	thread::spawn(move || {
		let answer = read_answer(&prompt, &mut output, &mut input);

		// Nobody is listening once the approval window has closed.
		let _ = sender.send(answer);
	});

	match receiver.await {
		Ok(Ok(Some(line))) => interpret_answer(&line),
		Ok(Ok(None)) | Err(_) => Err(ApprovalError::Abandoned),
		Ok(Err(e)) => Err(ApprovalError::Io(e)),
	}
}

/// Channel-backed port for hosts that collect the decision asynchronously.
///
/// Create it with [`ChannelApproval::new`], give the [`ApprovalSender`] to whatever
/// receives the user's answer, and hand the port to the coordinator. Decisions are queued and
/// each handshake consumes the next one, so one port can serve every handshake a
/// [`CredentialSource`](crate::flows::CredentialSource) runs. Once every sender is dropped
/// and the queue is empty, further approvals are abandoned.
#[derive(Debug)]
pub struct ChannelApproval {
	receiver: AsyncMutex<mpsc::UnboundedReceiver<Decision>>,
	published: Arc<Mutex<Option<Url>>>,
}
impl ChannelApproval {
	/// Creates a connected port + sender pair.
	pub fn new() -> (Self, ApprovalSender) {
		let (sender, receiver) = mpsc::unbounded_channel();
		let published = Arc::new(Mutex::new(None));
		let port = Self { receiver: AsyncMutex::new(receiver), published: published.clone() };

		(port, ApprovalSender { sender, published })
	}
}
impl ApprovalPort for ChannelApproval {
	fn await_approval<'a>(&'a self, authorize_url: &'a Url) -> ApprovalFuture<'a> {
		*self.published.lock() = Some(authorize_url.clone());

		Box::pin(async move {
			match self.receiver.lock().await.recv().await {
				Some(Decision::Approve(approval)) => Ok(approval),
				Some(Decision::Deny) => Err(ApprovalError::Denied),
				None => Err(ApprovalError::Abandoned),
			}
		})
	}
}

/// Sending half of a [`ChannelApproval`].
#[derive(Clone, Debug)]
pub struct ApprovalSender {
	sender: mpsc::UnboundedSender<Decision>,
	published: Arc<Mutex<Option<Url>>>,
}
impl ApprovalSender {
	/// Authorize URL of the most recent handshake that reached the approval step.
	pub fn authorize_url(&self) -> Option<Url> {
		self.published.lock().clone()
	}

	/// Queues an approval; returns `false` if the port is gone.
	pub fn approve(&self, approval: Approval) -> bool {
		self.sender.send(Decision::Approve(approval)).is_ok()
	}

	/// Queues a refusal; returns `false` if the port is gone.
	pub fn deny(&self) -> bool {
		self.sender.send(Decision::Deny).is_ok()
	}
}

#[derive(Debug)]
enum Decision {
	Approve(Approval),
	Deny,
}

fn read_answer(
	prompt: &str,
	output: &mut impl Write,
	input: &mut impl BufRead,
) -> io::Result<Option<String>> {
	output.write_all(prompt.as_bytes())?;
	output.flush()?;

	let mut line = String::new();

	Ok((input.read_line(&mut line)? > 0).then_some(line))
}

fn interpret_answer(answer: &str) -> Result<Approval, ApprovalError> {
	match answer.trim() {
		"" | "y" | "Y" | "yes" => Ok(Approval::granted()),
		"n" | "N" | "no" => Err(ApprovalError::Denied),
		code => Ok(Approval::with_verifier(code)),
	}
}
