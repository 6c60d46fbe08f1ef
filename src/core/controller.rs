/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Enter or leave AR
    ToggleAr,
    /// Select the next scene object for target nudging
    NextObject,
    NudgeXPos,
    NudgeXNeg,
    NudgeYPos,
    NudgeYNeg,
    NudgeZPos,
    NudgeZNeg,
    /// Simulated device yaw
    TurnLeft,
    TurnRight,
    /// Simulated device pitch
    TiltUp,
    TiltDown,
    /// Simulated device roll
    RollLeft,
    RollRight,
    Escape,
    MouseLeft,
}

impl Button {
    /// Target nudge direction for the nudge buttons
    pub fn nudge(self) -> Option<glam::Vec3> {
        use glam::Vec3;
        match self {
            Button::NudgeXPos => Some(Vec3::X),
            Button::NudgeXNeg => Some(Vec3::NEG_X),
            Button::NudgeYPos => Some(Vec3::Y),
            Button::NudgeYNeg => Some(Vec3::NEG_Y),
            Button::NudgeZPos => Some(Vec3::Z),
            Button::NudgeZNeg => Some(Vec3::NEG_Z),
            _ => None,
        }
    }
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Direction of a held pair: +1, -1 or 0
    fn axis(&self, positive: Button, negative: Button) -> f32 {
        match (self.is_down(positive), self.is_down(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct MockController {
        pressed: Vec<Button>,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.pressed
        }
    }

    #[test]
    fn test_button_hash() {
        let mut set = HashSet::new();
        set.insert(Button::TurnLeft);
        set.insert(Button::TurnLeft);
        set.insert(Button::ToggleAr);

        assert!(set.contains(&Button::TurnLeft));
        assert!(!set.contains(&Button::TiltUp));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_axis() {
        let controller = MockController {
            pressed: vec![Button::TurnLeft, Button::TiltUp, Button::TiltDown],
        };

        assert_eq!(controller.axis(Button::TurnRight, Button::TurnLeft), -1.0);
        assert_eq!(controller.axis(Button::TiltUp, Button::TiltDown), 0.0);
        assert_eq!(controller.axis(Button::RollRight, Button::RollLeft), 0.0);
    }

    #[test]
    fn test_nudge_directions() {
        assert_eq!(Button::NudgeZNeg.nudge(), Some(glam::Vec3::NEG_Z));
        assert_eq!(Button::ToggleAr.nudge(), None);
    }

    #[test]
    fn test_controller_get_down_keys() {
        let controller = MockController {
            pressed: vec![Button::MouseLeft, Button::RollLeft],
        };

        let down_keys = controller.get_down_keys();
        assert_eq!(down_keys.len(), 2);
        assert!(controller.is_down(Button::MouseLeft));
        assert!(!controller.is_down(Button::Escape));
    }
}
