use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Camera2D, Entity, RenderableKind, SceneWorld, Vec2};
use crate::sprite_keys::validate_sprite_key;

use super::transform::world_to_screen;
use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [14, 16, 22, 255];
const BACKDROP_FALLBACK_COLOR: [u8; 4] = [58, 92, 50, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprite_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_sprite_keys: HashSet<String>,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            sprite_root: asset_root.join("sprites"),
            sprite_cache: HashMap::new(),
            warned_sprite_keys: HashSet::new(),
            draw_order: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let viewport = self.viewport;
        if viewport.width == 0 || viewport.height == 0 {
            return Ok(());
        }
        let pixels_per_world = viewport.pixels_per_world();
        let camera = world.camera();

        collect_draw_order(world.entities(), &mut self.draw_order);

        let sprite_root = self.sprite_root.as_path();
        let sprite_cache = &mut self.sprite_cache;
        let warned_sprite_keys = &mut self.warned_sprite_keys;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(backdrop) = world.backdrop() {
            let rect = screen_rect(
                Vec2::ZERO,
                backdrop.half_extents,
                camera,
                viewport,
                pixels_per_world,
            );
            let sprite = resolve_cached_sprite(
                sprite_cache,
                warned_sprite_keys,
                sprite_root,
                &backdrop.sprite_key,
            );
            match sprite {
                Some(sprite) => draw_sprite_stretched(frame, viewport, rect, sprite, false),
                None => fill_rect(frame, viewport, rect, BACKDROP_FALLBACK_COLOR),
            }
        }

        for &index in &self.draw_order {
            let entity = &world.entities()[index];
            let rect = screen_rect(
                entity.transform.position,
                entity.renderable.half_extents,
                camera,
                viewport,
                pixels_per_world,
            );
            let sprite = match &entity.renderable.kind {
                RenderableKind::Sprite(key) => {
                    resolve_cached_sprite(sprite_cache, warned_sprite_keys, sprite_root, key)
                }
                RenderableKind::Placeholder => None,
            };
            match sprite {
                Some(sprite) => {
                    draw_sprite_stretched(frame, viewport, rect, sprite, entity.transform.flip_x)
                }
                None => fill_rect(frame, viewport, rect, entity.renderable.tint),
            }
        }

        self.pixels.render()
    }
}

/// Painter's order for a top-down view: higher on screen first, lower last.
fn collect_draw_order(entities: &[Entity], out: &mut Vec<usize>) {
    out.clear();
    out.extend(0..entities.len());
    out.sort_by(|&a, &b| {
        let ya = entities[a].transform.position.y;
        let yb = entities[b].transform.position.y;
        yb.total_cmp(&ya).then(a.cmp(&b))
    });
}

fn screen_rect(
    center: Vec2,
    half_extents: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> ScreenRectPx {
    let top_left = Vec2::new(center.x - half_extents.x, center.y + half_extents.y);
    let bottom_right = Vec2::new(center.x + half_extents.x, center.y - half_extents.y);
    let (left, top) = world_to_screen(top_left, camera, viewport, pixels_per_world);
    let (right, bottom) = world_to_screen(bottom_right, camera, viewport, pixels_per_world);
    ScreenRectPx {
        left,
        right: right.max(left + 1),
        top,
        bottom: bottom.max(top + 1),
    }
}

fn clip_rect(rect: ScreenRectPx, viewport: Viewport) -> Option<ScreenRectPx> {
    let clipped = ScreenRectPx {
        left: rect.left.max(0),
        right: rect.right.min(viewport.width as i32),
        top: rect.top.max(0),
        bottom: rect.bottom.min(viewport.height as i32),
    };
    (clipped.left < clipped.right && clipped.top < clipped.bottom).then_some(clipped)
}

fn fill_rect(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let Some(clipped) = clip_rect(rect, viewport) else {
        return;
    };
    let row_stride = viewport.width as usize * 4;
    for y in clipped.top..clipped.bottom {
        let row = y as usize * row_stride;
        for x in clipped.left..clipped.right {
            let offset = row + x as usize * 4;
            if let Some(pixel) = frame.get_mut(offset..offset + 4) {
                pixel.copy_from_slice(&color);
            }
        }
    }
}

fn draw_sprite_stretched(
    frame: &mut [u8],
    viewport: Viewport,
    rect: ScreenRectPx,
    sprite: &LoadedSprite,
    flip_x: bool,
) {
    if sprite.width == 0 || sprite.height == 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }
    let Some(clipped) = clip_rect(rect, viewport) else {
        return;
    };

    let rect_w = (rect.right - rect.left) as f32;
    let rect_h = (rect.bottom - rect.top) as f32;
    let row_stride = viewport.width as usize * 4;
    let sprite_stride = sprite.width as usize * 4;

    for out_y in clipped.top..clipped.bottom {
        let v = (out_y - rect.top) as f32 / rect_h;
        let src_y = ((v * sprite.height as f32) as u32).min(sprite.height - 1) as usize;
        for out_x in clipped.left..clipped.right {
            let mut u = (out_x - rect.left) as f32 / rect_w;
            if flip_x {
                u = 1.0 - u;
            }
            let src_x = ((u * sprite.width as f32) as u32).min(sprite.width - 1) as usize;
            let src = src_y * sprite_stride + src_x * 4;
            let alpha = sprite.rgba[src + 3];
            if alpha == 0 {
                continue;
            }
            let dst = out_y as usize * row_stride + out_x as usize * 4;
            if let Some(pixel) = frame.get_mut(dst..dst + 4) {
                pixel.copy_from_slice(&sprite.rgba[src..src + 4]);
            }
        }
    }
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_sprite_keys: &mut HashSet<String>,
    sprite_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let sprite = resolve_sprite_image_path(sprite_root, key)
            .and_then(|path| load_sprite_rgba(&path).map_err(|reason| (Some(path), reason)));
        let sprite = match sprite {
            Ok(sprite) => Some(sprite),
            Err((path, reason)) => {
                warn_sprite_load_once(warned_sprite_keys, key, path.as_deref(), &reason);
                None
            }
        };
        cache.insert(key.to_string(), sprite);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn resolve_sprite_image_path(
    sprite_root: &Path,
    key: &str,
) -> Result<PathBuf, (Option<PathBuf>, String)> {
    validate_sprite_key(key).map_err(|error| (None, format!("invalid_key:{error}")))?;
    Ok(sprite_root.join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}
