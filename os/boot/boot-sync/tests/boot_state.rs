use boot_error::Error;
use boot_sync::{BootLock, BootState};
use std::panic;

#[test]
fn lock_and_raii() {
    let l = BootLock::new(0_u32);

    {
        let mut g = l.lock();
        *g = 41;
    }

    {
        let mut g = l.lock();
        *g += 1;
        assert_eq!(*g, 42);
    }
    assert!(!l.is_held());
}

#[test]
fn reentry_is_detected_not_deadlocked() {
    let l = BootLock::new(1u8);

    let outer = l.try_lock();
    assert!(outer.is_some());
    assert!(l.is_held());

    // A nested attempt from the same context must fail immediately.
    assert!(l.try_lock().is_none());
    assert_eq!(l.try_with_lock(|v| *v), None);

    drop(outer);
    assert_eq!(l.try_with_lock(|v| *v), Some(1));
}

#[test]
fn failed_try_lock_does_not_release_holder() {
    let l = BootLock::new(());
    let held = l.lock();
    for _ in 0..3 {
        assert!(l.try_lock().is_none());
    }
    assert!(l.is_held());
    drop(held);
    assert!(!l.is_held());
}

#[test]
fn get_mut_allows_direct_mutation() {
    let mut l = BootLock::new(vec![1, 2, 3]);
    l.get_mut().push(4);
    assert_eq!(l.lock().as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn lock_is_released_on_panic() {
    let l = BootLock::new(0u32);

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        l.with_lock(|v| {
            *v = 123;
            panic!("boom");
        });
    }));
    assert!(res.is_err(), "expected panic");

    assert_eq!(l.with_lock(|v| *v), 123);
}

#[test]
fn state_requires_init() {
    let state: BootState<u32> = BootState::new();
    assert!(!state.is_initialized());
    assert_eq!(state.with(|v| *v), Err(Error::NotStarted));

    assert_eq!(state.init(7), None);
    assert_eq!(state.with(|v| *v + 1), Ok(8));
    assert_eq!(state.init(9), Some(7));

    assert_eq!(state.shutdown(), Some(9));
    assert_eq!(state.with(|v| *v), Err(Error::NotStarted));
}

#[test]
fn nested_state_access_reports_not_ready() {
    let state = BootState::new();
    state.init(String::from("log"));

    let nested = state.with(|outer| {
        outer.push('!');
        state.with(|inner| inner.len())
    });
    assert_eq!(nested, Ok(Err(Error::NotReady)));
    assert_eq!(state.with(|s| s.clone()), Ok(String::from("log!")));
}

#[test]
fn get_or_init_keeps_existing_state() {
    let state = BootState::new();
    assert_eq!(state.get_or_init(|| 1u8, |v| *v), Ok(1));
    assert_eq!(state.get_or_init(|| 2u8, |v| { *v += 10; *v }), Ok(11));
}

#[test]
fn statics_are_sync() {
    static STATE: BootState<u64> = BootState::new();
    fn takes_sync<S: Sync>(_s: &S) {}
    takes_sync(&STATE);
    takes_sync(&BootLock::new(0u8));
}
