// src/dag/work.rs

/// A unit of work the graph can schedule.
///
/// The scheduler only understands the boolean returned from [`Work::run`];
/// implementations must report failure through it rather than by panicking.
pub trait Work {
    /// Called on a completed node right before it is reset to waiting, so the
    /// work can drop results from its previous run.
    fn invalidated(&mut self);

    /// Execute the work to completion. `true` means success.
    fn run(&mut self) -> bool;
}

impl<W: Work + ?Sized> Work for Box<W> {
    fn invalidated(&mut self) {
        (**self).invalidated()
    }

    fn run(&mut self) -> bool {
        (**self).run()
    }
}
