use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crank::dag::Work;

/// What fake works did, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Trace {
    /// UIDs of works as they ran.
    pub runs: Vec<usize>,
    /// UIDs of works as they were invalidated.
    pub invalidations: Vec<usize>,
}

/// Hands out [`FakeWork`]s with sequential UIDs sharing one [`Trace`].
#[derive(Debug, Default, Clone)]
pub struct FakeWorkManager {
    trace: Rc<RefCell<Trace>>,
    next_uid: Rc<Cell<usize>>,
}

impl FakeWorkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A work reporting `result` when run. UIDs start at 0.
    pub fn create(&self, result: bool) -> FakeWork {
        let uid = self.next_uid.get();
        self.next_uid.set(uid + 1);
        FakeWork {
            uid,
            result: Rc::new(Cell::new(result)),
            trace: Rc::clone(&self.trace),
        }
    }

    pub fn runs(&self) -> Vec<usize> {
        self.trace.borrow().runs.clone()
    }

    pub fn invalidations(&self) -> Vec<usize> {
        self.trace.borrow().invalidations.clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        *self.trace.borrow_mut() = Trace::default();
    }
}

#[derive(Debug)]
pub struct FakeWork {
    uid: usize,
    result: Rc<Cell<bool>>,
    trace: Rc<RefCell<Trace>>,
}

impl FakeWork {
    pub fn uid(&self) -> usize {
        self.uid
    }

    /// Handle to flip the result after the work moved into a graph.
    pub fn result_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.result)
    }
}

impl Work for FakeWork {
    fn invalidated(&mut self) {
        self.trace.borrow_mut().invalidations.push(self.uid);
    }

    fn run(&mut self) -> bool {
        self.trace.borrow_mut().runs.push(self.uid);
        self.result.get()
    }
}
