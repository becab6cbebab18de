use std::any::Any;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;

use crate::error::DispatchError;

type Job<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;
type Waker = Arc<dyn Fn() + Send + Sync + 'static>;
type Slot<C> = RefCell<Option<C>>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Hosts living on this thread, so owner-thread `sync` calls can reach the
    // context directly instead of queueing behind themselves.
    static HOSTS: RefCell<Vec<(u64, Rc<dyn Any>)>> = const { RefCell::new(Vec::new()) };
}

struct Shared<C> {
    id: u64,
    owner: ThreadId,
    tx: Sender<Job<C>>,
    waker: RwLock<Option<Waker>>,
}

/// Creates a host/dispatcher pair owned by the calling thread.
///
/// The host stays on this thread and runs submitted closures against the
/// attached context when pumped. The dispatcher can be cloned and sent
/// anywhere.
pub fn render_channel<C: 'static>() -> (RenderHost<C>, RenderDispatcher<C>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let shared = Arc::new(Shared {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        owner: thread::current().id(),
        tx,
        waker: RwLock::new(None),
    });

    let slot: Rc<Slot<C>> = Rc::new(RefCell::new(None));
    HOSTS.with(|hosts| {
        hosts
            .borrow_mut()
            .push((shared.id, slot.clone() as Rc<dyn Any>));
    });

    let host = RenderHost {
        shared: shared.clone(),
        rx,
        slot,
    };
    (host, RenderDispatcher { shared })
}

fn lookup<C: 'static>(id: u64) -> Option<Rc<Slot<C>>> {
    HOSTS.with(|hosts| {
        hosts
            .borrow()
            .iter()
            .find(|(hid, _)| *hid == id)
            .and_then(|(_, slot)| slot.clone().downcast::<Slot<C>>().ok())
    })
}

/// Owning-thread half: holds the rendering context and services requests.
pub struct RenderHost<C: 'static> {
    shared: Arc<Shared<C>>,
    rx: Receiver<Job<C>>,
    slot: Rc<Slot<C>>,
}

impl<C: 'static> RenderHost<C> {
    /// Installs the context jobs run against, returning the previous one.
    pub fn attach(&self, context: C) -> Option<C> {
        log::debug!("render host {}: context attached", self.shared.id);
        self.slot.borrow_mut().replace(context)
    }

    pub fn detach(&self) -> Option<C> {
        log::debug!("render host {}: context detached", self.shared.id);
        self.slot.borrow_mut().take()
    }

    pub fn is_attached(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Mints another handle to this host.
    pub fn dispatcher(&self) -> RenderDispatcher<C> {
        RenderDispatcher {
            shared: self.shared.clone(),
        }
    }

    /// Borrows the attached context for owner-side work.
    ///
    /// Returns `None` when detached or already borrowed.
    pub fn context(&self) -> Option<RefMut<'_, C>> {
        let guard = self.slot.try_borrow_mut().ok()?;
        RefMut::filter_map(guard, Option::as_mut).ok()
    }

    /// Runs the jobs queued so far, one at a time, in arrival order.
    ///
    /// Jobs submitted while pumping wait for the next call. Nothing runs
    /// while no context is attached. Returns the number of jobs run.
    pub fn pump(&self) -> usize {
        let Some(mut ctx) = self.context() else {
            return 0;
        };

        let pending = self.rx.len();
        let mut ran = 0;
        for _ in 0..pending {
            let Ok(job) = self.rx.try_recv() else {
                break;
            };
            job(&mut *ctx);
            ran += 1;
        }
        ran
    }
}

impl<C: 'static> Drop for RenderHost<C> {
    fn drop(&mut self) {
        let id = self.shared.id;
        HOSTS.with(|hosts| hosts.borrow_mut().retain(|(hid, _)| *hid != id));
        log::debug!("render host {id}: dropped");
    }
}

/// Cross-thread handle that transfers closures to the owning thread.
pub struct RenderDispatcher<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for RenderDispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<C: 'static> RenderDispatcher<C> {
    pub fn owner(&self) -> ThreadId {
        self.shared.owner
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.shared.owner
    }

    /// Installs a callback used to wake the owning thread after a submission.
    pub fn set_waker<F>(&self, waker: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.waker.write() = Some(Arc::new(waker));
    }

    /// Runs `f` on the owning thread and returns its result.
    ///
    /// From any other thread this blocks until the owner has pumped the job.
    /// On the owning thread `f` runs immediately against the attached context.
    pub fn sync<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut C) -> anyhow::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        if self.is_owner_thread() {
            return self.run_inline(f);
        }

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let job: Job<C> = Box::new(move |ctx: &mut C| {
            // Caller is blocked on the other end; it cannot have gone away.
            let _ = reply_tx.send(f(ctx));
        });

        self.shared
            .tx
            .send(job)
            .map_err(|_| DispatchError::Disconnected)?;
        self.wake();

        reply_rx
            .recv()
            .map_err(|_| DispatchError::Disconnected)?
            .map_err(DispatchError::Failed)
    }

    fn run_inline<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut C) -> anyhow::Result<R>,
    {
        let slot = lookup::<C>(self.shared.id).ok_or(DispatchError::Disconnected)?;
        let mut guard = slot.try_borrow_mut().map_err(|_| DispatchError::Reentrant)?;
        let ctx = guard.as_mut().ok_or(DispatchError::Detached)?;
        f(ctx).map_err(DispatchError::Failed)
    }

    fn wake(&self) {
        let waker = self.shared.waker.read().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}
