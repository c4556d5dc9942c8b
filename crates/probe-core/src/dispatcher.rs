//! Main-loop dispatcher for work that must run on the host thread.
//!
//! Caller threads push boxed actions onto an unbounded crossbeam channel; the
//! host drains it once per tick. Each action receives the host context by
//! `&mut`, which is the only way anything outside the host loop touches
//! mutable simulation state.
//!
//! Drain policy: each drain runs the actions queued when it started. An
//! action enqueued while a drain is running (including from inside an
//! action) waits for the next tick, so a steadily refilled queue cannot
//! stretch a single tick.
//!
//! Loss: actions still queued when the dispatcher is dropped are dropped
//! unexecuted. Callers blocked in [`DispatchHandle::call_blocking`] see
//! [`BridgeError::ChannelDisconnected`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use tracing::{debug, error};

use crate::BridgeError;

/// A unit of work run once on the host thread.
pub type Action<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Actions that ran to completion.
    pub executed: usize,
    /// Actions that panicked.
    pub failed: usize,
}

/// Owner side of the queue, held by the host loop.
pub struct MainLoopDispatcher<C> {
    tx: Sender<Action<C>>,
    rx: Receiver<Action<C>>,
}

impl<C> std::fmt::Debug for MainLoopDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLoopDispatcher")
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl<C> Default for MainLoopDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MainLoopDispatcher<C> {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Cloneable enqueue-only handle for caller threads.
    #[must_use]
    pub fn handle(&self) -> DispatchHandle<C> {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Queue an action. Never blocks.
    pub fn enqueue(&self, action: impl FnOnce(&mut C) + Send + 'static) {
        // The receiver lives in `self`, so this send cannot fail.
        let _ = self.tx.send(Box::new(action));
    }

    /// Number of actions waiting for the next drain.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run the actions queued at the start of this call, in FIFO order.
    ///
    /// Must only be called from the host thread. A panicking action is
    /// logged and the remaining actions still run.
    pub fn drain(&self, ctx: &mut C) -> DrainStats {
        let mut stats = DrainStats::default();
        let budget = self.rx.len();

        for _ in 0..budget {
            let Ok(action) = self.rx.try_recv() else {
                break;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| action(ctx))) {
                Ok(()) => stats.executed += 1,
                Err(payload) => {
                    stats.failed += 1;
                    error!(reason = panic_message(&*payload), "dispatched action panicked");
                }
            }
        }

        if stats.executed + stats.failed > 0 {
            debug!(
                executed = stats.executed,
                failed = stats.failed,
                left = self.rx.len(),
                "drained dispatcher"
            );
        }
        stats
    }
}

/// Enqueue side of the dispatcher, safe to share across threads.
pub struct DispatchHandle<C> {
    tx: Sender<Action<C>>,
}

impl<C> Clone for DispatchHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> std::fmt::Debug for DispatchHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle").finish_non_exhaustive()
    }
}

impl<C> DispatchHandle<C> {
    /// Queue an action. Never blocks.
    ///
    /// If the host loop is gone the action is dropped and `false` returned.
    pub fn enqueue(&self, action: impl FnOnce(&mut C) + Send + 'static) -> bool {
        let sent = self.tx.send(Box::new(action)).is_ok();
        if !sent {
            debug!("dispatcher gone, action dropped");
        }
        sent
    }

    /// Queue `f` and return a [`Reply`] for its result.
    ///
    /// A panic inside `f` is caught on the host thread and answered with
    /// [`BridgeError::Panicked`], so the drain counts the action as executed.
    pub fn call<R, F>(&self, f: F) -> Reply<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.enqueue(move |ctx| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(ctx))).map_err(|payload| {
                let reason = panic_message(&*payload).to_owned();
                error!(%reason, "dispatched call panicked");
                BridgeError::Panicked(reason)
            });
            // Caller may have timed out and left.
            let _ = tx.send(result);
        });
        Reply { rx }
    }

    /// Queue `f` and block until the host tick answers or `timeout` passes.
    ///
    /// Must not be called from the host thread: the drain it waits on would
    /// never start.
    pub fn call_blocking<R, F>(&self, f: F, timeout: Duration) -> Result<R, BridgeError>
    where
        R: Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        self.call(f).wait_timeout(timeout)
    }
}

/// Answer to a [`DispatchHandle::call`], delivered once the host runs it.
///
/// If the action is dropped unexecuted (dispatcher gone) the reply
/// resolves to [`BridgeError::ChannelDisconnected`].
#[must_use = "a dropped reply discards the host's answer"]
pub struct Reply<R> {
    rx: Receiver<Result<R, BridgeError>>,
}

impl<R> std::fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("ready", &!self.rx.is_empty())
            .finish()
    }
}

impl<R> Reply<R> {
    /// Block until the host answers.
    pub fn wait(self) -> Result<R, BridgeError> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(BridgeError::ChannelDisconnected))
    }

    /// Block until the host answers or `timeout` passes.
    pub fn wait_timeout(self, timeout: Duration) -> Result<R, BridgeError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::ChannelDisconnected),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn test_fifo_order() {
        let dispatcher = MainLoopDispatcher::<Vec<u32>>::new();
        for i in 0..5 {
            dispatcher.enqueue(move |log| log.push(i));
        }

        let mut log = Vec::new();
        let stats = dispatcher.drain(&mut log);

        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert_eq!(stats.executed, 5);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_panicking_action_does_not_stop_drain() {
        let dispatcher = MainLoopDispatcher::<Vec<&'static str>>::new();
        dispatcher.enqueue(|log| log.push("a1"));
        dispatcher.enqueue(|_| panic!("boom"));
        dispatcher.enqueue(|log| log.push("a2"));

        let mut log = Vec::new();
        let stats = dispatcher.drain(&mut log);

        assert_eq!(log, vec!["a1", "a2"]);
        assert_eq!(
            stats,
            DrainStats {
                executed: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_actions_enqueued_during_drain_wait_for_next_tick() {
        let dispatcher = Arc::new(MainLoopDispatcher::<Vec<u32>>::new());
        let handle = dispatcher.handle();
        dispatcher.enqueue(move |log| {
            log.push(1);
            handle.enqueue(|log| log.push(2));
        });

        let mut log = Vec::new();
        dispatcher.drain(&mut log);
        assert_eq!(log, vec![1]);
        assert_eq!(dispatcher.pending(), 1);

        dispatcher.drain(&mut log);
        assert_eq!(log, vec![1, 2]);
    }

    #[test]
    fn test_per_thread_order_is_preserved() {
        let dispatcher = MainLoopDispatcher::<Vec<(usize, usize)>>::new();
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let handle = dispatcher.handle();
                thread::spawn(move || {
                    for seq in 0..100 {
                        handle.enqueue(move |log| log.push((worker, seq)));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut log = Vec::new();
        dispatcher.drain(&mut log);
        assert_eq!(log.len(), 400);

        for worker in 0..4 {
            let seqs: Vec<usize> = log
                .iter()
                .filter(|(w, _)| *w == worker)
                .map(|(_, s)| *s)
                .collect();
            assert_eq!(seqs, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_call_round_trip() {
        let dispatcher = MainLoopDispatcher::<u32>::new();
        let handle = dispatcher.handle();

        let caller = thread::spawn(move || {
            handle.call_blocking(|value| *value * 2, Duration::from_secs(5))
        });

        let mut value = 21;
        while !caller.is_finished() {
            dispatcher.drain(&mut value);
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(caller.join().unwrap().unwrap(), 42);
    }

    #[test]
    fn test_call_times_out_without_drain() {
        let dispatcher = MainLoopDispatcher::<u32>::new();
        let result = dispatcher
            .handle()
            .call_blocking(|value| *value, Duration::from_millis(10));
        assert!(matches!(result, Err(BridgeError::Timeout)));
    }

    #[test]
    fn test_panicking_call_reports_its_message() {
        let dispatcher = MainLoopDispatcher::<u32>::new();
        let reply = dispatcher.handle().call(|_| -> u32 { panic!("getter blew up") });

        let stats = dispatcher.drain(&mut 0);
        assert_eq!(
            stats,
            DrainStats {
                executed: 1,
                failed: 0
            }
        );
        assert!(matches!(
            reply.wait(),
            Err(BridgeError::Panicked(reason)) if reason == "getter blew up"
        ));
    }

    #[test]
    fn test_call_dropped_with_dispatcher_is_disconnected() {
        let dispatcher = MainLoopDispatcher::<u32>::new();
        let reply = dispatcher.handle().call(|value| *value);
        drop(dispatcher);

        assert!(matches!(reply.wait(), Err(BridgeError::ChannelDisconnected)));
    }

    #[test]
    fn test_actions_lost_when_dispatcher_dropped() {
        let ran = Arc::new(AtomicUsize::new(0));
        let dispatcher = MainLoopDispatcher::<()>::new();
        let handle = dispatcher.handle();

        let counter = Arc::clone(&ran);
        handle.enqueue(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(dispatcher);

        assert!(!handle.enqueue(|_| {}));
        let result = handle.call_blocking(|_| 1, Duration::from_millis(10));
        assert!(matches!(result, Err(BridgeError::ChannelDisconnected)));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
