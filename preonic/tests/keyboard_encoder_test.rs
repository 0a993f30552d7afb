pub mod common;

mod encoder_test {
    use preonic::era::ADJUST;
    use preonic::event::Direction;
    use rusty_fork::rusty_fork_test;

    use crate::common::{
        KC_LCTRL, KC_LSHIFT, TestKeyboard, create_test_keyboard, keyboard_reports, mouse_reports,
    };
    use crate::keys;

    fn enter_planck_mode(kb: &mut TestKeyboard) {
        kb.press(4, 4);
        kb.press(4, 6);
        kb.tap(2, 0);
        kb.release(4, 6);
        kb.release(4, 4);
    }

    rusty_fork_test! {
        #[test]
        fn test_scroll() {
            let mut kb = create_test_keyboard();
            assert_eq!(mouse_reports(&kb.rotate(Direction::Clockwise)), vec![(0, 1), (0, 0)]);
            assert_eq!(mouse_reports(&kb.rotate(Direction::CounterClockwise)), vec![(0, -1), (0, 0)]);
        }

        #[test]
        fn test_aggressive_scroll_with_shift() {
            let mut kb = create_test_keyboard();
            kb.press(3, 0);
            let reports = mouse_reports(&kb.rotate(Direction::CounterClockwise));
            assert_eq!(reports.len(), 100);
            assert_eq!(reports.iter().filter(|(_, wheel)| *wheel == -1).count(), 50);
            kb.release(3, 0);

            // Back to one tick per detent
            assert_eq!(mouse_reports(&kb.rotate(Direction::Clockwise)).len(), 2);
        }

        #[test]
        fn test_scroll_in_planck_mode() {
            let mut kb = create_test_keyboard();
            enter_planck_mode(&mut kb);
            assert_eq!(mouse_reports(&kb.rotate(Direction::Clockwise)), vec![(0, 1), (0, 0)]);
        }

        #[test]
        fn test_lower_f3() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            assert_eq!(
                keyboard_reports(&kb.rotate(Direction::Clockwise)),
                vec![(KC_LSHIFT, keys!(F3)), (0, keys!())]
            );
            assert_eq!(
                keyboard_reports(&kb.rotate(Direction::CounterClockwise)),
                vec![(0, keys!(F3)), (0, keys!())]
            );
            kb.release(4, 4);
        }

        #[test]
        fn test_raise_undo_redo() {
            let mut kb = create_test_keyboard();
            kb.press(4, 6);
            assert_eq!(
                keyboard_reports(&kb.rotate(Direction::Clockwise)),
                vec![(KC_LCTRL, keys!(Z)), (0, keys!())]
            );
            assert_eq!(
                keyboard_reports(&kb.rotate(Direction::CounterClockwise)),
                vec![(KC_LCTRL, keys!(Y)), (0, keys!())]
            );
            kb.release(4, 6);
        }

        #[test]
        fn test_adjust_does_nothing() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            kb.press(4, 6);
            assert!(kb.rotate(Direction::Clockwise).is_empty());
            assert!(kb.rotate(Direction::CounterClockwise).is_empty());
        }

        #[test]
        fn test_rotation_does_not_blink() {
            let mut kb = create_test_keyboard();
            let light = kb.keyboard.light_state();
            kb.rotate(Direction::Clockwise);
            assert_eq!(kb.keyboard.light_state(), light);
            assert!(kb.channels.light_signal.try_take().is_none());
        }

        #[test]
        fn test_encoder_click() {
            let mut kb = create_test_keyboard();
            let light = kb.keyboard.light_state();
            assert_eq!(mouse_reports(&kb.press(4, 0)), vec![(1, 0), (0, 0)]);
            assert!(kb.release(4, 0).is_empty());
            assert_eq!(kb.keyboard.light_state(), light);

            // Also clicks in Planck mode
            enter_planck_mode(&mut kb);
            assert_eq!(mouse_reports(&kb.press(4, 0)), vec![(1, 0), (0, 0)]);
            kb.release(4, 0);
        }

        #[test]
        fn test_encoder_click_on_lower() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            let light = kb.keyboard.light_state();
            assert!(kb.tap(4, 0).is_empty());
            assert_eq!(kb.keyboard.light_state(), light);
            kb.release(4, 4);
        }

        #[test]
        fn test_encoder_click_on_raise() {
            let mut kb = create_test_keyboard();
            kb.press(4, 6);
            let light = kb.keyboard.light_state();
            assert!(kb.tap(4, 0).is_empty());
            assert_eq!(kb.keyboard.light_state(), light);
            kb.release(4, 6);
        }

        #[test]
        fn test_encoder_click_on_adjust() {
            let mut kb = create_test_keyboard();
            kb.press(4, 4);
            kb.press(4, 6);
            assert!(kb.keyboard.is_layer_active(ADJUST));
            kb.songs();
            let light = kb.keyboard.light_state();
            assert!(kb.tap(4, 0).is_empty());
            assert_eq!(kb.keyboard.light_state(), light);
            assert!(kb.songs().is_empty());
            kb.release(4, 6);
            kb.release(4, 4);
        }
    }
}
