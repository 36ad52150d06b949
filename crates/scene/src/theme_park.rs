use glam::Vec3;
use std::path::PathBuf;

use crate::table::{AnimationSpec, ModelSpec, ObjectSpec, RotationSpec, SceneTable, SkyboxSpec};

const MODEL_DIR: &str = "resources/objects/themepark";
const SKYBOX_DIR: &str = "resources/textures/skybox";

/// Tilt shared by most rotated rides.
const TILT_DEGREES: f32 = 45.0;

/// Spin rate of the orbiting objects.
const ORBIT_DEGREES_PER_SECOND: f32 = -5.0;

const MODELS: &[(&str, &str)] = &[
    ("circus", "circus.obj"),
    ("ferris_wheel", "ferris_wheel_low_poly.obj"),
    ("food_cart", "street_food_cart.obj"),
    ("seesaw", "seesaw_type-1.obj"),
    ("airship_restaurant", "airship_restaurant.obj"),
    ("mascot", "mickey_mouse.obj"),
    ("roller_coaster", "the_fall.obj"),
    ("swing", "swing.obj"),
    ("slide", "slide_playground.obj"),
    ("sport_car", "zis-101a_sport_1938.obj"),
    ("hot_air_balloon", "hot_air_balloon_low_poly.obj"),
    ("spaceship_carousel", "spaceship_carousel.obj"),
    ("helix_carousel", "carousel_helix.obj"),
    ("speedboat", "speedboat.obj"),
    ("claw_machine", "claw_machine.obj"),
    ("helicopter", "helicopter.obj"),
    ("christmas_carousel", "christmas_carousel.obj"),
    ("playground", "playground.obj"),
    ("cathedral", "cologne_cathedral.obj"),
    ("pool_float", "inflatable_pool_float.obj"),
    ("fountain", "fountain.obj"),
    ("bench", "bench.obj"),
];

fn object(name: &str, model: &str, translation: Vec3, scale: Vec3) -> ObjectSpec {
    ObjectSpec {
        name: name.into(),
        model: model.into(),
        translation,
        scale,
        rotation: None,
        animation: None,
    }
}

fn tilted(mut spec: ObjectSpec, axis: Vec3) -> ObjectSpec {
    spec.rotation = Some(RotationSpec {
        degrees: TILT_DEGREES,
        axis,
    });
    spec
}

fn orbiting(mut spec: ObjectSpec, axis: Vec3, offset: Vec3) -> ObjectSpec {
    spec.animation = Some(AnimationSpec {
        axis,
        degrees_per_second: ORBIT_DEGREES_PER_SECOND,
        offset,
    });
    spec
}

/// The built-in theme park layout.
pub fn theme_park() -> SceneTable {
    let models = MODELS
        .iter()
        .map(|(key, file)| ModelSpec {
            key: (*key).into(),
            path: PathBuf::from(MODEL_DIR).join(file),
        })
        .collect();

    let up = |y: f32| Vec3::new(0.0, y, 0.0);
    let orbit_offset = Vec3::new(300.0, 0.0, 0.0);

    #[rustfmt::skip]
    let objects = vec![
        object("circus", "circus", Vec3::new(-90.0, -30.0, -480.0), Vec3::splat(8.0)),
        tilted(object("ferris wheel", "ferris_wheel", Vec3::new(-100.0, -30.0, -100.0), Vec3::splat(8.0)), up(0.25)),
        object("food cart", "food_cart", Vec3::new(140.0, -10.0, -200.0), Vec3::splat(12.0)),
        object("seesaw", "seesaw", Vec3::new(75.0, -10.0, -200.0), Vec3::splat(12.0)),
        object("airship restaurant", "airship_restaurant", Vec3::new(-100.0, 20.0, 300.0), Vec3::splat(8.0)),
        tilted(
            orbiting(object("mascot", "mascot", Vec3::new(-25.0, -10.0, 0.0), Vec3::splat(0.5)), up(0.5), orbit_offset),
            Vec3::new(0.4, 0.6, 0.8),
        ),
        tilted(object("roller coaster", "roller_coaster", Vec3::new(-300.0, -10.0, -380.0), Vec3::new(5.0, 5.0, 10.0)), up(0.15)),
        tilted(object("swing", "swing", Vec3::new(200.0, -10.0, -100.0), Vec3::splat(0.07)), up(0.4)),
        object("slide", "slide", Vec3::new(200.0, -10.0, -0.3), Vec3::splat(6.0)),
        object("sport car", "sport_car", Vec3::new(40.0, -10.0, -200.0), Vec3::splat(70.0)),
        tilted(object("hot air balloon (near)", "hot_air_balloon", Vec3::new(40.0, 30.0, 0.0), Vec3::splat(0.7)), up(-0.15)),
        object("spaceship carousel", "spaceship_carousel", Vec3::new(305.0, -10.0, -100.0), Vec3::splat(20.0)),
        object("helix carousel", "helix_carousel", Vec3::new(55.0, -10.0, -200.0), Vec3::splat(6.0)),
        object("speedboat (west)", "speedboat", Vec3::new(-45.0, -20.0, 90.0), Vec3::splat(3.0)),
        tilted(object("hot air balloon (far)", "hot_air_balloon", Vec3::new(340.0, 40.0, 45.0), Vec3::splat(0.7)), up(-0.15)),
        object("speedboat (east)", "speedboat", Vec3::new(0.0, -20.0, 90.0), Vec3::splat(3.0)),
        object("claw machine", "claw_machine", Vec3::new(20.0, -10.0, -160.0), Vec3::splat(6.0)),
        tilted(
            orbiting(object("helicopter", "helicopter", Vec3::new(0.0, 40.0, 90.0), Vec3::splat(0.01)), up(0.5), orbit_offset),
            up(0.8),
        ),
        object("christmas carousel", "christmas_carousel", Vec3::new(85.0, -10.0, 20.0), Vec3::splat(3.0)),
        object("water playground", "playground", Vec3::new(50.0, -20.0, 170.0), Vec3::splat(12.0)),
        object("cathedral (far)", "cathedral", Vec3::new(-400.0, -20.0, 1850.0), Vec3::splat(150.0)),
        tilted(object("pool float", "pool_float", Vec3::new(-40.0, -20.0, 360.0), Vec3::splat(0.05)), up(-0.15)),
        object("fountain", "fountain", Vec3::new(40.0, -10.0, -50.0), Vec3::splat(3.0)),
        tilted(object("bench", "bench", Vec3::new(1850.0, -10.0, -10.0), Vec3::new(5.0, 5.0, 10.0)), up(0.15)),
        object("cathedral (near)", "cathedral", Vec3::new(-400.0, -20.0, 1050.0), Vec3::splat(150.0)),
    ];

    let faces = ["posx.jpg", "negx.jpg", "posy.jpg", "negy.jpg", "posz.jpg", "negz.jpg"]
        .map(|f| PathBuf::from(SKYBOX_DIR).join(f));

    SceneTable {
        models,
        objects,
        skybox: SkyboxSpec { faces },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_object_references_a_model() {
        let table = theme_park();
        for obj in &table.objects {
            assert!(
                table.model_path(&obj.model).is_some(),
                "{} has no model",
                obj.name
            );
        }
        assert!(table.unused_models().is_empty());
    }

    #[test]
    fn shared_models_are_placed_more_than_once() {
        let table = theme_park();
        let count = |key: &str| table.objects.iter().filter(|o| o.model == key).count();
        assert_eq!(count("hot_air_balloon"), 2);
        assert_eq!(count("speedboat"), 2);
        assert_eq!(count("cathedral"), 2);
    }

    #[test]
    fn orbiting_objects() {
        let table = theme_park();
        let orbiting: Vec<&str> = table
            .objects
            .iter()
            .filter(|o| o.animation.is_some())
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(orbiting, vec!["mascot", "helicopter"]);
    }

    #[test]
    fn skybox_faces_in_cubemap_order() {
        let table = theme_park();
        assert!(table.skybox.faces[0].ends_with("posx.jpg"));
        assert!(table.skybox.faces[5].ends_with("negz.jpg"));
    }

    #[test]
    fn round_trips_through_yaml() {
        let table = theme_park();
        let yaml = table.to_yaml_string().unwrap();
        assert_eq!(SceneTable::from_yaml_str(&yaml).unwrap(), table);
    }
}
