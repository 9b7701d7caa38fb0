use bevy::prelude::*;

/// A single pointer (left mouse button or first touch) converted into world space.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed(Vec2),
    Dragged(Vec2),
    Released,
}

pub fn just_pressed_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

pub fn pressed_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else {
        touch_input.iter().next().map(bevy::input::touch::Touch::position)
    }
}

/// Released this frame, either the mouse button or the last touch (cancelled touches count).
pub fn just_released(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
) -> bool {
    button_input.just_released(MouseButton::Left)
        || touch_input.any_just_released()
        || touch_input.any_just_canceled()
}

pub fn screen_to_world(
    position: Vec2,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;

    camera
        .viewport_to_world_2d(camera_transform, position)
        .ok()
}

pub fn just_pressed_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = just_pressed_screen_position(button_input, touch_input, windows)?;
    screen_to_world(position, camera)
}

pub fn pressed_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = pressed_screen_position(button_input, touch_input, windows)?;
    screen_to_world(position, camera)
}

impl PointerEvent {
    /// This frame's pointer activity as events. A tap that starts and ends within one frame
    /// yields the press followed by the release.
    pub fn from_frame(
        pressed_at: Option<Vec2>,
        released: bool,
        held_at: Option<Vec2>,
    ) -> Vec<Self> {
        match (pressed_at, released) {
            (Some(position), true) => vec![Self::Pressed(position), Self::Released],
            (Some(position), false) => vec![Self::Pressed(position)],
            (None, true) => vec![Self::Released],
            (None, false) => held_at.map(Self::Dragged).into_iter().collect(),
        }
    }
}

pub fn pointer_events(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Vec<PointerEvent> {
    PointerEvent::from_frame(
        just_pressed_world_position(button_input, touch_input, windows, camera),
        just_released(button_input, touch_input),
        pressed_world_position(button_input, touch_input, windows, camera),
    )
}
