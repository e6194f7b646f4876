use crate::derived::Derived;
use crate::id::AtomId;
use crate::traits::{Observable, Readable};
use core_types::{Listener, ListenerId};
use std::rc::Rc;

/// A derived read side paired with a write handler.
///
/// The handler is free to write any number of other atoms; it receives only
/// the action. Reads inside the handler go straight to the atoms it captured.
pub struct Writable<T, A, R = ()> {
    read: Derived<T>,
    write: Rc<dyn Fn(A) -> R>,
}

impl<T, A, R> Clone for Writable<T, A, R> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
            write: self.write.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static, A: 'static, R: 'static> Writable<T, A, R> {
    pub fn new(read: Derived<T>, write: impl Fn(A) -> R + 'static) -> Self {
        Self {
            read,
            write: Rc::new(write),
        }
    }

    pub fn get(&self) -> T {
        self.read.get()
    }

    pub fn write(&self, action: A) -> R {
        (self.write)(action)
    }

    pub fn read_side(&self) -> &Derived<T> {
        &self.read
    }
}

impl<T: Clone + PartialEq + 'static, A: 'static, R: 'static> Observable for Writable<T, A, R> {
    fn atom_id(&self) -> AtomId {
        self.read.atom_id()
    }

    fn add_listener(&self, listener: Listener) -> ListenerId {
        self.read.add_listener(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.read.remove_listener(id);
    }

    fn is_mounted(&self) -> bool {
        self.read.is_mounted()
    }
}

impl<T: Clone + PartialEq + 'static, A: 'static, R: 'static> Readable<T> for Writable<T, A, R> {
    fn get(&self) -> T {
        self.read.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::State;
    use std::cell::Cell;

    #[test]
    fn write_handler_updates_backing_state() {
        let celsius = State::new(0.0_f64);
        let fahrenheit = Writable::new(
            Derived::new({
                let celsius = celsius.clone();
                move |get| get.get(&celsius) * 9.0 / 5.0 + 32.0
            }),
            {
                let celsius = celsius.clone();
                move |f: f64| {
                    celsius.set((f - 32.0) * 5.0 / 9.0);
                }
            },
        );

        let hits = Rc::new(Cell::new(0));
        let _sub = fahrenheit.subscribe({
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });

        fahrenheit.write(212.0);
        assert_eq!(celsius.get(), 100.0);
        assert_eq!(fahrenheit.get(), 212.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn write_can_return_a_result() {
        let n = State::new(0_u8);
        let checked: Writable<u8, u16, Result<(), String>> = Writable::new(
            Derived::new({
                let n = n.clone();
                move |get| get.get(&n)
            }),
            {
                let n = n.clone();
                move |v: u16| {
                    let v = u8::try_from(v).map_err(|e| e.to_string())?;
                    n.set(v);
                    Ok(())
                }
            },
        );
        assert!(checked.write(300).is_err());
        assert!(checked.write(7).is_ok());
        assert_eq!(checked.get(), 7);
    }
}
