pub mod common;

mod layer_test {
    use preonic::audio::songs;
    use preonic::era::{ADJUST, LOWER, PLANCK};
    use rusty_fork::rusty_fork_test;

    use crate::common::{KC_LSHIFT, TestKeyboard, create_test_keyboard, keyboard_reports};
    use crate::{kc_to_u8, keys};

    /// Hold lower then raise to reach the adjust layer
    fn enter_adjust(kb: &mut TestKeyboard) {
        kb.press(4, 4);
        kb.press(4, 6);
    }

    fn leave_adjust(kb: &mut TestKeyboard) {
        kb.release(4, 6);
        kb.release(4, 4);
    }

    rusty_fork_test! {
        #[test]
        fn test_base_layer() {
            let mut kb = create_test_keyboard();
            assert_eq!(
                keyboard_reports(&kb.tap(1, 1)),
                vec![(0, keys!(Q)), (0, keys!())]
            );
            assert_eq!(
                keyboard_reports(&kb.tap(0, 0)),
                vec![(0, keys!(Minus)), (0, keys!())]
            );
        }

        #[test]
        fn test_momentary_layers() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            assert!(kb.keyboard.is_layer_active(LOWER));
            assert_eq!(
                keyboard_reports(&kb.tap(2, 3)),
                vec![(0, keys!(F3)), (0, keys!())]
            );
            kb.release(4, 4);
            assert!(!kb.keyboard.is_layer_active(LOWER));

            // Shifted symbols on raise
            kb.press(4, 6);
            assert_eq!(
                keyboard_reports(&kb.tap(1, 1)),
                vec![(KC_LSHIFT, keys!(Kc1)), (0, keys!())]
            );
            kb.release(4, 6);
        }

        #[test]
        fn test_release_uses_cached_layer() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            assert_eq!(keyboard_reports(&kb.press(1, 11)), vec![(0, keys!(Delete))]);
            kb.release(4, 4);
            // Delete is released, even though the base layer has backspace here
            assert_eq!(keyboard_reports(&kb.release(1, 11)), vec![(0, keys!())]);
        }

        #[test]
        fn test_adjust_layer() {
            let mut kb = create_test_keyboard();
            enter_adjust(&mut kb);
            assert!(kb.keyboard.is_layer_active(ADJUST));
            // Unused keys of the adjust layer do nothing
            assert!(keyboard_reports(&kb.tap(3, 5)).is_empty());
            leave_adjust(&mut kb);
            assert!(!kb.keyboard.is_layer_active(ADJUST));
        }

        #[test]
        fn test_planck_mode() {
            let mut kb = create_test_keyboard();

            enter_adjust(&mut kb);
            kb.press(2, 0);
            // The layer is toggled on release
            assert!(!kb.keyboard.is_layer_active(PLANCK));
            kb.release(2, 0);
            leave_adjust(&mut kb);
            assert!(kb.keyboard.is_layer_active(PLANCK));
            assert_eq!(kb.songs(), vec![songs::PLANCK_SOUND]);

            // The number row is disabled, the rest falls through
            assert!(keyboard_reports(&kb.tap(0, 1)).is_empty());
            assert_eq!(
                keyboard_reports(&kb.tap(1, 1)),
                vec![(0, keys!(Q)), (0, keys!())]
            );
            kb.press(4, 4);
            assert_eq!(
                keyboard_reports(&kb.tap(1, 1)),
                vec![(0, keys!(Kc1)), (0, keys!())]
            );
            kb.release(4, 4);

            // Back to the Preonic
            enter_adjust(&mut kb);
            kb.tap(2, 0);
            leave_adjust(&mut kb);
            assert!(!kb.keyboard.is_layer_active(PLANCK));
            assert_eq!(kb.songs(), vec![songs::PREONIC_SOUND]);
            assert_eq!(
                keyboard_reports(&kb.tap(0, 1)),
                vec![(0, keys!(Kc1)), (0, keys!())]
            );
        }

        #[test]
        fn test_modifier_keys() {
            let mut kb = create_test_keyboard();
            assert_eq!(keyboard_reports(&kb.press(3, 0)), vec![(KC_LSHIFT, keys!())]);
            assert_eq!(keyboard_reports(&kb.press(2, 1)), vec![(KC_LSHIFT, keys!(A))]);
            assert_eq!(keyboard_reports(&kb.release(3, 0)), vec![(0, keys!(A))]);
            assert_eq!(keyboard_reports(&kb.release(2, 1)), vec![(0, keys!())]);
        }

        #[test]
        fn test_six_keys_rollover() {
            let mut kb = create_test_keyboard();
            for col in 1..=6 {
                kb.press(2, col);
            }
            // The seventh key is dropped
            assert_eq!(
                keyboard_reports(&kb.press(2, 7)),
                vec![(0, keys!(A, S, D, F, G, H))]
            );
            kb.release(2, 1);
            assert_eq!(
                keyboard_reports(&kb.release(2, 2)),
                vec![(0, [0, 0, kc_to_u8!(D), kc_to_u8!(F), kc_to_u8!(G), kc_to_u8!(H)])]
            );
        }
    }
}
