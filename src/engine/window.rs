//! Windowed stream mapper: bounded-concurrency map of a stream through a blocking function.
//!
//! At most `window` inputs are in flight on the mapper's [`BlockingPool`] at any time. Results are
//! yielded in submission order: a fast later item never overtakes a slow earlier one. A new input
//! is pulled from the source only when a slot is free, so a slow consumer stalls submissions at
//! the window boundary.
//!
//! Synchronous sources enter through [`WindowedMapper::from_iter`]; they are adapted into a
//! stream so both kinds share the same windowing code.

use anyhow::Result;
use futures_util::stream::{self, Stream};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::engine::pool::{BlockingPool, TaskHandle};
use crate::error::TaskError;

/// What the mapper does after a transform fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Yield the failure and keep going.
    #[default]
    Continue,
    /// Yield the failure, stop pulling new inputs, drain and discard what is in flight, end.
    AbortRemaining,
}

/// Settings for one mapper instance.
#[derive(Clone, Debug)]
pub struct WindowOpts {
    /// Thread name prefix of the mapper's pool.
    pub name: String,
    /// Max in-flight submissions; also the pool size.
    pub window: usize,
    pub policy: FailurePolicy,
}

impl WindowOpts {
    pub fn new(name: &str, window: usize) -> Self {
        Self {
            name: name.to_string(),
            window,
            policy: FailurePolicy::Continue,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One completed slot: the input it was created from and what the transform produced.
#[derive(Debug)]
pub struct Mapped<A, B, E> {
    pub input: A,
    pub result: Result<B, TaskError<E>>,
}

struct Slot<A, B, E> {
    input: A,
    handle: TaskHandle<Result<B, E>>,
}

type Transform<A, B, E> = Arc<dyn Fn(A) -> Result<B, E> + Send + Sync>;

/// Stream of [`Mapped`] results; see the module docs for the ordering and window rules.
pub struct WindowedMapper<S: Stream, B, E> {
    source: S,
    source_done: bool,
    aborted: bool,
    slots: VecDeque<Slot<S::Item, B, E>>,
    window: usize,
    policy: FailurePolicy,
    transform: Transform<S::Item, B, E>,
    submitted: usize,
    // Declared last: dropped after the slots, blocking until in-flight work has drained.
    pool: BlockingPool,
}

// Fields are never pinned structurally: the source is only polled through `Pin::new`, which
// already requires `S: Unpin`, and task handles are always `Unpin`.
impl<S: Stream, B, E> Unpin for WindowedMapper<S, B, E> {}

impl<It, B, E> WindowedMapper<stream::Iter<It>, B, E>
where
    It: Iterator + Unpin,
    It::Item: Clone + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    /// Mapper over a synchronous iterator.
    pub fn from_iter<I, F>(iter: I, transform: F, opts: WindowOpts) -> Result<Self>
    where
        I: IntoIterator<IntoIter = It>,
        F: Fn(It::Item) -> Result<B, E> + Send + Sync + 'static,
    {
        Self::new(stream::iter(iter), transform, opts)
    }
}

impl<S, B, E> WindowedMapper<S, B, E>
where
    S: Stream + Unpin,
    S::Item: Clone + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    /// Mapper over an asynchronous source. Spawns a pool of `opts.window` workers.
    pub fn new<F>(source: S, transform: F, opts: WindowOpts) -> Result<Self>
    where
        F: Fn(S::Item) -> Result<B, E> + Send + Sync + 'static,
    {
        let pool = BlockingPool::new(&opts.name, opts.window)?;
        Ok(Self {
            source,
            source_done: false,
            aborted: false,
            slots: VecDeque::with_capacity(opts.window),
            window: opts.window,
            policy: opts.policy,
            transform: Arc::new(transform),
            submitted: 0,
            pool,
        })
    }

    /// Max in-flight submissions.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Submissions currently in flight (never more than [`window`](Self::window)).
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Total inputs pulled from the source and submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    fn submit(&mut self, input: S::Item) {
        let transform = Arc::clone(&self.transform);
        let arg = input.clone();
        let handle = self.pool.submit(move || transform(arg));
        self.slots.push_back(Slot { input, handle });
        self.submitted += 1;
    }

    /// Pull from the source until the window is full, the source is exhausted, or it has
    /// nothing ready yet.
    fn fill_window(&mut self, cx: &mut Context<'_>) {
        while !self.source_done && !self.aborted && self.slots.len() < self.window {
            match Pin::new(&mut self.source).poll_next(cx) {
                Poll::Ready(Some(input)) => self.submit(input),
                Poll::Ready(None) => self.source_done = true,
                Poll::Pending => break,
            }
        }
    }

    /// Poll the oldest slot. `Ready(None)` means no slots are left.
    fn poll_front(&mut self, cx: &mut Context<'_>) -> Poll<Option<Mapped<S::Item, B, E>>> {
        let Some(front) = self.slots.front_mut() else {
            return Poll::Ready(None);
        };
        let joined = match Pin::new(&mut front.handle).poll(cx) {
            Poll::Ready(joined) => joined,
            Poll::Pending => return Poll::Pending,
        };
        let Some(slot) = self.slots.pop_front() else {
            return Poll::Ready(None);
        };
        let result = match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TaskError::Failed(e)),
            Err(join) => Err(TaskError::Join(join)),
        };
        Poll::Ready(Some(Mapped {
            input: slot.input,
            result,
        }))
    }
}

impl<S, B, E> Stream for WindowedMapper<S, B, E>
where
    S: Stream + Unpin,
    S::Item: Clone + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    type Item = Mapped<S::Item, B, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.aborted {
            // Drain in-flight work so no result is left behind on the workers, then end.
            while let Poll::Ready(Some(_discarded)) = this.poll_front(cx) {}
            return if this.slots.is_empty() {
                Poll::Ready(None)
            } else {
                Poll::Pending
            };
        }

        this.fill_window(cx);

        match this.poll_front(cx) {
            Poll::Ready(Some(mapped)) => {
                if mapped.result.is_err() && this.policy == FailurePolicy::AbortRemaining {
                    this.aborted = true;
                }
                Poll::Ready(Some(mapped))
            }
            // No slots: finished if the source is, otherwise the source registered the waker.
            Poll::Ready(None) if this.source_done => Poll::Ready(None),
            Poll::Ready(None) | Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.aborted {
            return (0, Some(0));
        }
        let (lower, upper) = if self.source_done {
            (0, Some(0))
        } else {
            self.source.size_hint()
        };
        let in_flight = self.slots.len();
        (
            lower.saturating_add(in_flight),
            upper.and_then(|u| u.checked_add(in_flight)),
        )
    }
}
