use avian2d::prelude::*;
use bevy::prelude::*;
use motor2d::MotorPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "motor2d sandbox".to_string(),
                resolution: (1280, 720).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(MotorPlugin::from_file("assets/profiles/default.ron"))
        .run();
}
