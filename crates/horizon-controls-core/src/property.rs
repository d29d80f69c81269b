//! Observable properties for Horizon Controls.
//!
//! A [`Property<T>`] is a settable cell that notifies subscribers synchronously
//! when its value changes. Widgets share properties through [`SharedProperty`]
//! (an `Arc<Property<T>>`): the application owns the cell, widgets reference
//! it and never destroy it.
//!
//! Notification happens after the write lock has been released, so a
//! subscriber may read or even set the property again.
//!
//! # Example
//!
//! ```
//! use horizon_controls_core::Property;
//!
//! let enabled = Property::shared(true);
//! let _link = enabled.link(|value| println!("enabled: {value}"));
//!
//! assert!(enabled.set(false));
//! assert!(!enabled.set(false)); // unchanged, no notification
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{PropertyError, PropertyResult};
use crate::signal::{Signal, Subscription};

/// A property shared between an owner and the widgets bound to it.
pub type SharedProperty<T> = Arc<Property<T>>;

type Validator<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Describes a single value change.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange<T> {
    /// The value after the change.
    pub new: T,
    /// The value before the change.
    pub old: T,
}

/// An observable value with change detection.
pub struct Property<T> {
    name: String,
    value: RwLock<T>,
    validator: Option<Validator<T>>,
    changed: Signal<PropertyChange<T>>,
}

impl<T> Property<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            name: String::new(),
            value: RwLock::new(value),
            validator: None,
            changed: Signal::new(),
        }
    }

    /// Create a new property already wrapped for sharing.
    pub fn shared(value: T) -> SharedProperty<T> {
        Arc::new(Self::new(value))
    }

    /// Name the property. The name shows up in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a validator. Values for which it returns `false` are rejected
    /// by [`try_set`](Self::try_set) and ignored by [`set`](Self::set).
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Wrap the property for sharing.
    pub fn into_shared(self) -> SharedProperty<T> {
        Arc::new(self)
    }

    /// The property's name (empty if unnamed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Whether the validator (if any) accepts `value`.
    pub fn accepts(&self, value: &T) -> bool {
        self.validator.as_ref().is_none_or(|validate| validate(value))
    }

    /// Set the value, notifying subscribers if it changed.
    ///
    /// Returns `Ok(true)` if the value changed, `Ok(false)` if it was equal to
    /// the current one.
    pub fn try_set(&self, value: T) -> PropertyResult<bool> {
        if !self.accepts(&value) {
            return Err(PropertyError::Rejected {
                name: self.name.clone(),
            });
        }
        Ok(self.replace(value).is_some())
    }

    /// Set the value, notifying subscribers if it changed.
    ///
    /// Returns `true` if the value changed. A value refused by the validator
    /// is logged and dropped; use [`try_set`](Self::try_set) to observe the
    /// rejection.
    pub fn set(&self, value: T) -> bool {
        match self.try_set(value) {
            Ok(changed) => changed,
            Err(err) => {
                crate::controls_error!(property = %self.name, "{err}");
                false
            }
        }
    }

    /// Set the value and return the previous one if it changed.
    ///
    /// Bypasses the validator.
    pub fn replace(&self, value: T) -> Option<T> {
        let old = {
            let mut current = self.value.write();
            if *current == value {
                return None;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        tracing::trace!(target: "horizon_controls_core::property", property = %self.name, "property changed");
        self.changed.emit(PropertyChange {
            new: value,
            old: old.clone(),
        });
        Some(old)
    }

    /// Set the value without notifying subscribers.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// Subscribe to future changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PropertyChange<T>) + Send + Sync + 'static,
    {
        self.changed.subscribe(listener)
    }

    /// Call `listener` with the current value now and with every future value.
    pub fn link<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        listener(&self.get());
        self.changed.subscribe(move |change| listener(&change.new))
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.changed.connection_count()
    }

    /// The change signal backing this property.
    pub fn changed(&self) -> &Signal<PropertyChange<T>> {
        &self.changed
    }
}

impl<T> Default for Property<T>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &*self.value.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<bool>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);

        assert!(!prop.set(10));
        assert_eq!(prop.get(), 10);

        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_subscribe_receives_old_and_new() {
        let prop = Property::new("a".to_string());
        let changes = Arc::new(Mutex::new(Vec::new()));

        let changes_clone = changes.clone();
        let _sub = prop.subscribe(move |change| {
            changes_clone
                .lock()
                .push((change.old.clone(), change.new.clone()));
        });

        prop.set("b".to_string());
        prop.set("b".to_string());
        prop.set("c".to_string());

        assert_eq!(
            *changes.lock(),
            vec![
                ("a".to_string(), "b".to_string()),
                ("b".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn test_link_calls_immediately() {
        let prop = Property::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        let link = prop.link(move |&value| seen_clone.lock().push(value));
        prop.set(2);
        drop(link);
        prop.set(3);

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(prop.subscriber_count(), 0);
    }

    #[test]
    fn test_set_silent_does_not_notify() {
        let prop = Property::new(0);
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let _sub = prop.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        prop.set_silent(5);
        assert_eq!(prop.get(), 5);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validator_rejects() {
        let prop = Property::new(0.5_f64)
            .with_name("opacity")
            .with_validator(|v| *v > 0.0 && *v < 1.0);

        assert_eq!(prop.try_set(0.25), Ok(true));
        assert_eq!(
            prop.try_set(1.5),
            Err(PropertyError::Rejected {
                name: "opacity".to_string()
            })
        );
        assert!(!prop.set(-1.0));
        assert_eq!(prop.get(), 0.25);
    }

    #[test]
    fn test_subscriber_may_set_again() {
        let prop = Property::shared(0);

        let prop_clone = prop.clone();
        let _sub = prop.subscribe(move |change| {
            if change.new == 1 {
                prop_clone.set(2);
            }
        });

        prop.set(1);
        assert_eq!(prop.get(), 2);
    }

    #[test]
    fn test_replace_returns_old_value() {
        let prop = Property::new("hello".to_string());
        assert!(prop.replace("hello".to_string()).is_none());
        assert_eq!(prop.replace("world".to_string()), Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }
}
