//! Window Filter Policy Tests
//!
//! Every combination of the five filter conditions, checked exhaustively
//! and as a property.

use proptest::prelude::*;
use surface_capture_rust::capture::headless::HEADLESS_ROOT;
use surface_capture_rust::discovery::evaluate_window;
use surface_capture_rust::*;

/// The five conditions a window must all satisfy to be captured
#[derive(Debug, Clone, Copy)]
struct Flags {
    top_level: bool,
    titled: bool,
    restored: bool,
    visible: bool,
    uncloaked: bool,
}

impl Flags {
    fn from_bits(bits: u8) -> Self {
        Self {
            top_level: bits & 1 != 0,
            titled: bits & 2 != 0,
            restored: bits & 4 != 0,
            visible: bits & 8 != 0,
            uncloaked: bits & 16 != 0,
        }
    }

    fn all_pass(&self) -> bool {
        self.top_level && self.titled && self.restored && self.visible && self.uncloaked
    }

    fn window(&self, handle: u64) -> HeadlessWindow {
        let title = if self.titled { format!("Window {}", handle) } else { String::new() };
        let mut window = HeadlessWindow::new(handle, title, Rect::new(0, 0, 100, 100))
            .minimized(!self.restored)
            .visible(self.visible)
            .cloaked(!self.uncloaked);
        if !self.top_level {
            window = window.owned_by(WindowHandle::from_raw(0xdead));
        }
        window
    }

    fn expected_rejection(&self) -> Option<RejectReason> {
        if !self.top_level {
            Some(RejectReason::OwnedWindow)
        } else if !self.titled {
            Some(RejectReason::EmptyTitle)
        } else if !self.restored {
            Some(RejectReason::Minimized)
        } else if !self.visible {
            Some(RejectReason::NotVisible)
        } else if !self.uncloaked {
            Some(RejectReason::HiddenFromUser)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_all_pass_combination_is_accepted() {
        let mut desktop = HeadlessDesktop::new();
        for bits in 0..32u8 {
            desktop = desktop.with_window(Flags::from_bits(bits).window(100 + bits as u64));
        }

        let accepted: Vec<SurfaceDescriptor> = discover_all(&desktop).unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].handle(), Some(WindowHandle::from_raw(100 + 31)));
        assert_eq!(accepted[0].label(), "Window 131");
    }

    #[test]
    fn test_rejection_reason_follows_check_order() {
        for bits in 0..32u8 {
            let flags = Flags::from_bits(bits);
            let desktop = HeadlessDesktop::new().with_window(flags.window(7));

            let verdict = evaluate_window(&desktop, WindowHandle::from_raw(7));
            match flags.expected_rejection() {
                Some(reason) => assert_eq!(verdict, Err(reason), "flags {:?}", flags),
                None => assert_eq!(verdict, Ok("Window 7".to_string())),
            }
        }
    }

    #[test]
    fn test_window_owned_by_root_is_accepted() {
        let desktop = HeadlessDesktop::new().with_window(
            HeadlessWindow::new(3, "Main", Rect::new(0, 0, 10, 10)).owned_by(HEADLESS_ROOT),
        );
        assert_eq!(discover_all(&desktop).unwrap().len(), 1);
    }

    #[test]
    fn test_occluded_window_is_still_captured() {
        // Two visible windows at the same position: the lower one is fully
        // covered but remains a capture candidate.
        let desktop = HeadlessDesktop::new()
            .with_window(HeadlessWindow::new(3, "Below", Rect::new(0, 0, 10, 10)))
            .with_window(HeadlessWindow::new(4, "Above", Rect::new(0, 0, 10, 10)));

        let labels: Vec<String> = discover_all(&desktop)
            .unwrap()
            .iter()
            .map(|d| d.label().to_string())
            .collect();
        assert_eq!(labels, vec!["Below", "Above"]);
    }

    proptest! {
        #[test]
        fn prop_accepted_windows_satisfy_every_condition(
            windows in prop::collection::vec(0u8..32, 0..24)
        ) {
            let mut desktop = HeadlessDesktop::new();
            for (i, bits) in windows.iter().enumerate() {
                desktop = desktop.with_window(Flags::from_bits(*bits).window(10 + i as u64));
            }

            let accepted: Vec<WindowHandle> = discover_all(&desktop)
                .unwrap()
                .iter()
                .filter_map(|d| d.handle())
                .collect();

            let expected: Vec<WindowHandle> = windows
                .iter()
                .enumerate()
                .filter(|(_, bits)| Flags::from_bits(**bits).all_pass())
                .map(|(i, _)| WindowHandle::from_raw(10 + i as u64))
                .collect();

            prop_assert_eq!(accepted, expected);
        }
    }
}
