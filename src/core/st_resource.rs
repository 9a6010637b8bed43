use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` shares one value of type `T` between several owners on the same thread,
/// such as the chunk storage used by the main menu and every game session it starts.
/// It uses `Rc<RefCell<T>>` internally.
///
/// # Examples
///
/// ```
/// use tile_sandbox::core::StResource;
///
/// let resource = StResource::new(vec![1, 2, 3]);
/// let clone = resource.clone();
///
/// // All clones share the same underlying data
/// clone.get_mut().push(4);
/// assert_eq!(resource.get().len(), 4);
/// ```
///
/// # Panics
/// - Panics if the value is mutably borrowed while trying to borrow it again
/// - Panics if the value is borrowed while trying to borrow it mutably
pub struct StResource<T: ?Sized> {
    pub resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }
}

impl<T: ?Sized> StResource<T> {
    /// Returns a guard that allows reading the contained value.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Returns a guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Whether both handles share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: ?Sized> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: Rc::clone(&self.resource),
        }
    }
}

impl<T: Default> Default for StResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
