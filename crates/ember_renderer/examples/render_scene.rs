//! Render one of the built-in demo scenes.
//!
//! Run with: cargo run --release --example render_scene -- <scene> [output] [config.json]
//!
//! The output format follows the extension: `.png` goes through the `image`
//! crate, anything else is written as plain-text PPM. The optional JSON file
//! overrides `RenderConfig` fields (resolution, samples, depth, seed); the
//! background always comes from the scene.

use anyhow::{bail, Context, Result};
use ember_math::sampling::{random_vec3, random_vec3_range};
use ember_renderer::{
    render, AaRect, Background, Block, BvhNode, Camera, Color, ConstantMedium, Dielectric,
    DiffuseLight, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseTexture, Point3, RenderConfig, Sphere, Texture, Transformed, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

const SCENES: &[&str] = &[
    "random_spheres",
    "two_perlin_spheres",
    "simple_light",
    "cornell_box",
    "cornell_smoke",
    "earth",
];

/// Environment variable naming the image used by the `earth` scene.
const EARTH_TEXTURE_VAR: &str = "EMBER_EARTH_TEXTURE";

struct Scene {
    world: Arc<dyn Hittable>,
    camera: Camera,
    background: Background,
    /// Width over height the framing was designed for
    aspect_ratio: f32,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: render_scene <scene> [output.ppm|output.png] [config.json]");
        println!("\nScenes:");
        for name in SCENES {
            println!("  {}", name);
        }
        return Ok(());
    }

    let scene_name = args[1].as_str();
    let output = args.get(2).map_or("output.ppm", String::as_str);
    let mut config = match args.get(3) {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scene = build_scene(scene_name, &mut rng)?;

    // Keep the configured width and derive the height from the scene framing
    config.image_height = ((config.image_width as f32 / scene.aspect_ratio) as u32).max(1);
    config.background = scene.background;
    let camera = scene.camera.with_aspect_ratio(config.aspect_ratio());

    println!(
        "Rendering '{}' at {}x{} @ {} spp...",
        scene_name, config.image_width, config.image_height, config.samples_per_pixel
    );
    let start = std::time::Instant::now();
    let image = render(&camera, scene.world.as_ref(), &config);
    println!("Rendered in {:?}", start.elapsed());

    save(&image, output)?;
    println!("Saved to {}", output);
    Ok(())
}

fn load_config(path: &str) -> Result<RenderConfig> {
    let file = File::open(path).with_context(|| format!("Failed to open config {}", path))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse config {}", path))
}

fn save(image: &ember_renderer::ImageBuffer, output: &str) -> Result<()> {
    let is_png = Path::new(output)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.as_bytes().to_vec())
            .context("Image buffer does not match its dimensions")?;
        rgb.save(output)
            .with_context(|| format!("Failed to write {}", output))?;
    } else {
        let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
        image
            .write_ppm(BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", output))?;
    }
    Ok(())
}

fn build_scene(name: &str, rng: &mut dyn RngCore) -> Result<Scene> {
    let scene = match name {
        "random_spheres" => random_spheres(rng)?,
        "two_perlin_spheres" => two_perlin_spheres(rng),
        "simple_light" => simple_light(rng),
        "cornell_box" => cornell_box(false),
        "cornell_smoke" => cornell_box(true),
        "earth" => earth()?,
        other => bail!("Unknown scene '{}' (expected one of {})", other, SCENES.join(", ")),
    };
    Ok(scene)
}

fn lambertian(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(color))
}

fn random_spheres(rng: &mut dyn RngCore) -> Result<Scene> {
    let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();

    // Checkered ground
    let checker = Texture::checker(
        Texture::solid(Color::new(0.2, 0.3, 0.1)),
        Texture::solid(Color::new(0.9, 0.9, 0.9)),
    );
    objects.push(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::textured(checker)),
    )));

    // Small random spheres; the diffuse ones bounce upward during the shutter
    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Point3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo: Color = random_vec3(rng) * random_vec3(rng);
                let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                objects.push(Arc::new(MovingSphere::new(
                    (center, center1),
                    (0.0, 1.0),
                    0.2,
                    lambertian(albedo),
                )));
            } else if choose_mat < 0.95 {
                let albedo: Color = random_vec3_range(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                objects.push(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))));
            } else {
                objects.push(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    // Three main spheres
    objects.push(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.push(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    )));
    objects.push(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    log::info!("Random spheres scene: {} objects", objects.len());
    let world = BvhNode::new(objects, 0.0, 1.0, rng).context("Failed to build BVH")?;

    Ok(Scene {
        world: Arc::new(world),
        camera: Camera::new()
            .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.1, 10.0)
            .with_shutter(0.0, 1.0),
        background: Background::sky(),
        aspect_ratio: 16.0 / 9.0,
    })
}

fn two_perlin_spheres(rng: &mut dyn RngCore) -> Scene {
    let marble: Arc<dyn Material> =
        Arc::new(Lambertian::textured(NoiseTexture::marble(4.0, rng).into()));

    let mut world = HittableList::new();
    world.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    world.push(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, marble));

    Scene {
        world: Arc::new(world),
        camera: Camera::new()
            .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.0, 10.0),
        background: Background::sky(),
        aspect_ratio: 16.0 / 9.0,
    }
}

fn simple_light(rng: &mut dyn RngCore) -> Scene {
    let noise: Arc<dyn Material> =
        Arc::new(Lambertian::textured(NoiseTexture::new(4.0, rng).into()));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(4.0)));

    let mut world = HittableList::new();
    world.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, noise.clone()));
    world.push(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, noise));
    world.push(Sphere::new(Point3::new(0.0, 7.0, 0.0), 2.0, light.clone()));
    world.push(AaRect::xy((3.0, 5.0), (1.0, 3.0), -2.0, light));

    Scene {
        world: Arc::new(world),
        camera: Camera::new()
            .with_position(Point3::new(26.0, 3.0, 6.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_lens(20.0, 0.0, 10.0),
        background: Background::Solid(Color::ZERO),
        aspect_ratio: 16.0 / 9.0,
    }
}

/// The Cornell box, with its two blocks either solid or filled with smoke.
fn cornell_box(smoke: bool) -> Scene {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    let mut world = HittableList::new();
    world.push(AaRect::yz((0.0, 555.0), (0.0, 555.0), 555.0, green));
    world.push(AaRect::yz((0.0, 555.0), (0.0, 555.0), 0.0, red));
    world.push(AaRect::xz((0.0, 555.0), (0.0, 555.0), 0.0, white.clone()));
    world.push(AaRect::xz((0.0, 555.0), (0.0, 555.0), 555.0, white.clone()));
    world.push(AaRect::xy((0.0, 555.0), (0.0, 555.0), 555.0, white.clone()));

    // Smoke needs a larger, dimmer light to read well
    if smoke {
        let light = Arc::new(DiffuseLight::new(Color::splat(7.0)));
        world.push(AaRect::xz((113.0, 443.0), (127.0, 432.0), 554.0, light));
    } else {
        let light = Arc::new(DiffuseLight::new(Color::splat(15.0)));
        world.push(AaRect::xz((213.0, 343.0), (227.0, 332.0), 554.0, light));
    }

    let tall: Arc<dyn Hittable> = Arc::new(Transformed::translate(
        Arc::new(Transformed::rotate_y(
            Arc::new(Block::new(Point3::ZERO, Point3::new(165.0, 330.0, 165.0), white.clone())),
            15.0,
        )),
        Vec3::new(265.0, 0.0, 295.0),
    ));
    let short: Arc<dyn Hittable> = Arc::new(Transformed::translate(
        Arc::new(Transformed::rotate_y(
            Arc::new(Block::new(Point3::ZERO, Point3::splat(165.0), white)),
            -18.0,
        )),
        Vec3::new(130.0, 0.0, 65.0),
    ));

    if smoke {
        world.push(ConstantMedium::new(tall, 0.01, Color::ZERO));
        world.push(ConstantMedium::new(short, 0.01, Color::ONE));
    } else {
        world.add(tall);
        world.add(short);
    }

    Scene {
        world: Arc::new(world),
        camera: Camera::new()
            .with_position(
                Point3::new(278.0, 278.0, -800.0),
                Point3::new(278.0, 278.0, 0.0),
                Vec3::Y,
            )
            .with_lens(40.0, 0.0, 10.0),
        background: Background::Solid(Color::ZERO),
        aspect_ratio: 1.0,
    }
}

fn earth() -> Result<Scene> {
    let path = env::var(EARTH_TEXTURE_VAR).unwrap_or_else(|_| "earthmap.jpg".to_string());
    let texture = ImageTexture::open(&path)
        .with_context(|| format!("Failed to load earth texture {} (set {})", path, EARTH_TEXTURE_VAR))?;

    let mut world = HittableList::new();
    world.push(Sphere::new(
        Point3::ZERO,
        2.0,
        Arc::new(Lambertian::textured(texture.into())),
    ));

    Ok(Scene {
        world: Arc::new(world),
        camera: Camera::new()
            .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.0, 10.0),
        background: Background::sky(),
        aspect_ratio: 16.0 / 9.0,
    })
}
