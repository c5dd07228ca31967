//! Hierarchical wall-clock timers for profiling the solver internals.

use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use web_time::Instant;
    } else {
        use std::time::Instant;
    }
}

#[derive(Debug, Default)]
struct TimerNode {
    start: Option<Instant>,
    elapsed: Duration,
    children: TimerList,
}

impl TimerNode {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.children.0.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn suspend(&mut self) {
        //bank the current elapsed and suspend children
        //if this timer appears active
        if let Some(instant) = self.start {
            self.elapsed += instant.elapsed();
            self.children.suspend();
        }
    }

    fn resume(&mut self) {
        //resume if this timer appears active.
        //just refresh start time to now.
        if self.start.is_some() {
            self.start = Some(Instant::now());
            self.children.resume();
        }
    }
}

//children kept in insertion order so that reports print
//in the order the phases actually run
#[derive(Debug, Default)]
struct TimerList(Vec<(&'static str, TimerNode)>);

impl TimerList {
    fn get_mut(&mut self, key: &'static str) -> Option<&mut TimerNode> {
        self.0.iter_mut().find(|(k, _)| *k == key).map(|(_, t)| t)
    }

    fn entry(&mut self, key: &'static str) -> &mut TimerNode {
        if let Some(idx) = self.0.iter().position(|(k, _)| *k == key) {
            &mut self.0[idx].1
        } else {
            self.0.push((key, TimerNode::default()));
            &mut self.0.last_mut().unwrap().1
        }
    }

    fn reset_child(&mut self, key: &'static str) {
        self.entry(key).reset();
    }

    fn start_child(&mut self, key: &'static str) {
        self.entry(key).start();
    }

    fn suspend(&mut self) {
        for (_, t) in self.0.iter_mut() {
            t.suspend();
        }
    }

    fn resume(&mut self) {
        for (_, t) in self.0.iter_mut() {
            t.resume();
        }
    }

    fn total_time(&self) -> Duration {
        self.0
            .iter()
            .fold(Duration::ZERO, |acc, (_, t)| acc + t.elapsed)
    }

    fn print(&self, depth: u8) {
        for (key, val) in self.0.iter() {
            let tabs = format!("{: <1$}", "", 4 * depth as usize);
            println!("{}{:} : {:?}", tabs, *key, val.elapsed);
            val.children.print(depth + 1);
        }
    }
}

/// A stack of named, nestable timers.  `start_as_current` pushes a timer
/// under whichever timer is currently running, so profiles come out as a
/// tree mirroring the call structure.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    children: TimerList,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut TimerNode> {
        let (&first, rest) = self.stack.split_first()?;

        //the root gets special treatment since self is not
        //a TimerNode and a common trait would be overkill
        let mut active = self.children.get_mut(first)?;

        for key in rest {
            active = active.children.get_mut(*key)?;
        }
        Some(active)
    }

    pub fn reset_timer(&mut self, key: &'static str) {
        self.children.reset_child(key);
    }

    /// Starts a timer named `key` nested under the current timer and
    /// makes it current.
    pub fn start_as_current(&mut self, key: &'static str) {
        if let Some(active) = self.mut_active_timer() {
            active.children.start_child(key);
        } else {
            self.children.start_child(key);
        }
        self.stack.push(key);
    }

    /// Stops the current timer and pops it from the stack.
    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    //Suspend every timer in the collection.  Used for notimeit!
    pub fn suspend(&mut self) {
        self.children.suspend();
    }

    //Resume every timer in the collection.  Used for notimeit!
    pub fn resume(&mut self) {
        self.children.resume();
    }

    pub fn total_time(&self) -> Duration {
        self.children.total_time()
    }

    pub fn print(&self) {
        self.children.print(0);
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_and_order() {
        let mut t = Timers::default();
        t.start_as_current("solve");
        t.start_as_current("factor");
        t.stop_current();
        t.start_as_current("substitute");
        t.stop_current();
        t.stop_current();

        assert!(t.total_time() >= Duration::ZERO);
        let keys: Vec<_> = t.children.0.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["solve"]);
        let inner: Vec<_> = t.children.0[0].1.children.0.iter().map(|(k, _)| *k).collect();
        assert_eq!(inner, vec!["factor", "substitute"]);
    }
}
