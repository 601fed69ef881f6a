use std::collections::HashMap;

use tilebatch::renderer::vertex::TileVertex;
use tilebatch::*;

// Helper: a full-size handle for base texture `id`.
fn tex(id: u64, w: f32, h: f32) -> TextureHandle {
    TextureHandle::new(BaseTextureId(id), w, h)
}

fn tilemap(textures: u64) -> Tilemap {
    Tilemap::new(Tileset::from_textures((0..textures).map(|i| tex(i, 64.0, 64.0))))
}

fn sized(w: f32, h: f32) -> TileOptions {
    TileOptions::new().size(w, h)
}

// ── Appending & bounds ────────────────────────────────────────────────────

#[test]
fn bounds_cover_both_tiles() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(32.0, 32.0)).unwrap();
    map.tile(0u32, 100.0, 100.0, &sized(16.0, 16.0)).unwrap();

    assert_eq!(
        map.local_bounds(None),
        Some(Rect { min_x: 0.0, min_y: 0.0, max_x: 116.0, max_y: 116.0 })
    );
}

#[test]
fn bounds_do_not_depend_on_append_order() {
    let tiles = [(5.0, -3.0, 8.0, 8.0), (-20.0, 40.0, 16.0, 4.0), (7.0, 7.0, 1.0, 100.0)];

    let mut forward = tilemap(1);
    for &(x, y, w, h) in &tiles {
        forward.tile(0u32, x, y, &sized(w, h)).unwrap();
    }
    let mut backward = tilemap(1);
    for &(x, y, w, h) in tiles.iter().rev() {
        backward.tile(0u32, x, y, &sized(w, h)).unwrap();
    }

    let rect = forward.local_bounds(None).unwrap();
    assert_eq!(rect, backward.local_bounds(None).unwrap());
    assert_eq!(rect, Rect { min_x: -20.0, min_y: -3.0, max_x: 13.0, max_y: 107.0 });
}

#[test]
fn child_bounds_are_merged_when_present() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(10.0, 10.0)).unwrap();
    let mut children = Bounds::new();
    children.add_frame_pad(50.0, 50.0, 60.0, 60.0, 0.0, 0.0);

    let rect = map.local_bounds(Some(&children)).unwrap();
    assert_eq!((rect.max_x, rect.max_y), (60.0, 60.0));
    assert_eq!(map.local_bounds(None).unwrap().max_x, 10.0);
}

#[test]
fn handle_defaults_come_from_texture_frame() {
    let frame = TextureHandle::frame(BaseTextureId(7), 16.0, 32.0, 8.0, 12.0);
    let mut map = Tilemap::new(Tileset::from_textures([tex(7, 256.0, 256.0)]));

    let id = map.tile(&frame, 4.0, 4.0, &TileOptions::default()).unwrap();
    let rec = map.tile_record(id).unwrap();
    assert_eq!((rec.u, rec.v), (16.0, 32.0));
    assert_eq!((rec.tile_width, rec.tile_height), (8.0, 12.0));
    assert_eq!(rec.texture_index, 0);
    assert_eq!(rec.anim_count_x, TilemapSettings::DEFAULT_ANIM_COUNT);
}

#[test]
fn unknown_handle_is_rejected_without_side_effects() {
    let mut map = tilemap(2);
    let stranger = tex(99, 16.0, 16.0);

    let err = map.tile(&stranger, 0.0, 0.0, &TileOptions::default()).unwrap_err();
    assert!(matches!(err, TilemapError::UnresolvedTexture(_)));
    assert!(map.is_empty());
    assert!(map.bounds().is_empty());
}

#[test]
fn key_resolves_through_lookup() {
    let mut assets: HashMap<String, TextureHandle> = HashMap::new();
    assets.insert("grass".to_string(), tex(1, 32.0, 32.0));
    let mut map = tilemap(2).with_lookup(assets);

    let id = map.tile("grass", 0.0, 0.0, &TileOptions::default()).unwrap();
    assert_eq!(map.tile_record(id).unwrap().texture_index, 1);

    let err = map.tile("lava", 0.0, 0.0, &TileOptions::default()).unwrap_err();
    assert!(matches!(err, TilemapError::UnresolvedTexture(ref k) if k == "lava"));
    assert_eq!(map.len(), 1);
}

#[test]
fn rotation_outside_group_is_rejected() {
    let mut map = tilemap(1);
    let err = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0).rotate(8)).unwrap_err();
    assert!(matches!(err, TilemapError::InvalidRotation(8)));
    assert!(map.is_empty());
}

#[test]
fn mirrored_codes_are_accepted() {
    let mut map = tilemap(1);
    for code in [1, 3, 5, 7] {
        map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0).rotate(code)).unwrap();
    }
    assert_eq!(map.len(), 4);
}

#[test]
fn non_positive_anim_divisor_is_rejected() {
    let mut map = tilemap(1);
    let err = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0).anim_divisor(0.0)).unwrap_err();
    assert!(matches!(err, TilemapError::InvalidAnimDivisor(d) if d == 0.0));
    assert!(map.is_empty());

    let id = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    assert!(map.tile_anim_divisor(id, -2.0).is_err());
    assert!(map.tile_anim_divisor(id, f32::NAN).is_err());
    assert_eq!(map.tile_record(id).unwrap().anim_divisor, 1.0);
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: TileOptions =
        serde_json::from_str(r#"{ "tile_width": 16, "tile_height": 8, "rotate": 2 }"#).unwrap();
    assert_eq!(opts.tile_width, Some(16.0));
    assert_eq!(opts.rotate, 2);
    assert_eq!(opts.alpha, 1.0);
    assert_eq!(opts.anim_divisor, 1.0);
    assert_eq!(opts.u, None);
}

// ── Editing through handles ───────────────────────────────────────────────

#[test]
fn edits_address_the_given_tile() {
    let mut map = tilemap(1);
    let first = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    let second = map.tile(0u32, 8.0, 0.0, &sized(8.0, 8.0)).unwrap();

    map.tile_rotate(first, 4).unwrap();
    map.tile_alpha(second, 0.5).unwrap();
    map.tile_anim_divisor(first, 3.0).unwrap();

    let a = map.tile_record(first).unwrap();
    let b = map.tile_record(second).unwrap();
    assert_eq!((a.rotate, a.alpha, a.anim_divisor), (4, 1.0, 3.0));
    assert_eq!((b.rotate, b.alpha), (0, 0.5));
}

#[test]
fn last_tile_edits_are_noops_when_empty() {
    let mut map = tilemap(1);
    assert!(map.last_tile().is_none());
    assert!(map.tile_rotate_last(2).is_ok());
    assert!(map.tile_alpha_last(0.1).is_ok());
    assert!(map.tile_anim_x_last(16.0, 4.0).is_ok());
    assert!(map.is_empty());
    assert!(!map.has_animated_tile());
}

#[test]
fn last_tile_edits_touch_most_recent_append() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    let last = map.tile(0u32, 8.0, 0.0, &sized(8.0, 8.0)).unwrap();

    map.tile_anim_y_last(8.0, 3.0).unwrap();
    let rec = map.tile_record(last).unwrap();
    assert_eq!((rec.anim_y, rec.anim_count_y), (8.0, 3.0));
    assert!(map.has_animated_tile());
}

#[test]
fn clear_resets_bounds_animation_and_handles() {
    let mut map = tilemap(1);
    let id = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0).anim(8.0, 0.0)).unwrap();
    assert!(map.has_animated_tile());

    map.clear();
    assert!(map.bounds().is_empty());
    assert_eq!(map.local_bounds(None), None);
    assert!(!map.has_animated_tile());
    assert!(matches!(map.tile_alpha(id, 0.5), Err(TilemapError::StaleTile(_))));

    // A new tile in the same slot gets a fresh handle.
    let fresh = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    assert_eq!(fresh.index(), id.index());
    assert_ne!(fresh, id);
}

// ── Encoding ──────────────────────────────────────────────────────────────

#[test]
fn zero_anim_count_encodes_as_unbounded() {
    let mut map = tilemap(1);
    let options = sized(16.0, 16.0).anim(16.0, 8.0).anim_count(0.0, 3.0);
    map.tile(0u32, 0.0, 0.0, &options).unwrap();
    assert_eq!(map.records().next().map(|r| r.anim_count_x), Some(0.0));

    map.prepare(&CompositeSignal::STANDALONE);
    for vertex in map.vertices() {
        assert_eq!(vertex.anim, [16.0 + 1024.0 * 2048.0, 8.0 + 3.0 * 2048.0]);
    }
}

#[test]
fn unrotated_tile_emits_corners_in_order() {
    let mut map = tilemap(1);
    map.tile(0u32, 10.0, 20.0, &sized(32.0, 16.0).source(64.0, 0.0)).unwrap();
    assert!(map.prepare(&CompositeSignal::STANDALONE));

    let v = map.vertices();
    assert_eq!(v.len(), 4);
    let positions: Vec<[f32; 2]> = v.iter().map(|v| v.position).collect();
    let uvs: Vec<[f32; 2]> = v.iter().map(|v| v.uv).collect();
    assert_eq!(positions, vec![[10.0, 20.0], [42.0, 20.0], [42.0, 36.0], [10.0, 36.0]]);
    assert_eq!(uvs, vec![[64.0, 0.0], [96.0, 0.0], [96.0, 16.0], [64.0, 16.0]]);
    for vertex in v {
        assert_eq!(vertex.frame, [64.5, 0.5, 95.5, 15.5]);
        assert_eq!(vertex.texture_id, 0.0);
        assert_eq!(vertex.alpha, 1.0);
    }
}

#[test]
fn tiles_with_missing_texture_are_skipped() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.tile(3u32, 8.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.tile(0u32, 16.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);

    assert_eq!(map.len(), 3);
    assert_eq!(map.quad_count(), 2);
    assert_eq!(map.vertices()[4].position, [16.0, 0.0]);
    // Bounds still include the skipped tile.
    assert_eq!(map.local_bounds(None).unwrap().max_x, 24.0);
}

#[test]
fn adding_the_texture_later_makes_skipped_tiles_draw() {
    let mut map = tilemap(1);
    map.tile(1u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);
    assert_eq!(map.quad_count(), 0);

    map.add_texture(tex(1, 8.0, 8.0));
    assert!(map.prepare(&CompositeSignal::STANDALONE));
    assert_eq!(map.quad_count(), 1);
}

// ── Dirty tracking ────────────────────────────────────────────────────────

#[test]
fn unchanged_static_tilemap_skips_encode() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();

    assert!(map.prepare(&CompositeSignal::STANDALONE));
    let bytes = map.vertex_bytes().to_vec();
    let generation = map.vertex_buffer().generation();
    assert!(!map.prepare(&CompositeSignal::STANDALONE));
    assert_eq!(map.vertex_bytes(), &bytes[..]);
    assert_eq!(map.vertex_buffer().generation(), generation);
}

#[test]
fn structural_change_and_edits_force_encode() {
    let mut map = tilemap(1);
    let id = map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);

    map.tile(0u32, 8.0, 0.0, &sized(8.0, 8.0)).unwrap();
    assert!(map.prepare(&CompositeSignal::STANDALONE));
    assert!(!map.prepare(&CompositeSignal::STANDALONE));

    map.tile_alpha(id, 0.25).unwrap();
    assert!(map.prepare(&CompositeSignal::STANDALONE));
    assert_eq!(map.vertices()[0].alpha, 0.25);
}

#[test]
fn animated_tile_encodes_every_frame() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0).anim(8.0, 0.0)).unwrap();

    for _ in 0..3 {
        assert!(map.prepare(&CompositeSignal::STANDALONE));
    }
}

#[test]
fn anim_refresh_signal_forces_encode() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);

    let refresh = CompositeSignal { anim_refresh: true, ..CompositeSignal::STANDALONE };
    assert!(map.prepare(&refresh));
    assert!(!map.prepare(&CompositeSignal::STANDALONE));
}

#[test]
fn clear_then_refill_to_same_count_still_encodes() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);

    map.clear();
    map.tile(0u32, 50.0, 50.0, &sized(8.0, 8.0)).unwrap();
    assert!(map.prepare(&CompositeSignal::STANDALONE));
    assert_eq!(map.vertices()[0].position, [50.0, 50.0]);
}

#[test]
fn context_loss_forces_encode_and_new_storage() {
    let mut map = tilemap(1);
    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);
    let generation = map.vertex_buffer().generation();

    map.invalidate_gpu();
    assert!(map.prepare(&CompositeSignal::STANDALONE));
    assert!(map.vertex_buffer().generation() > generation);
}

// ── Buffer growth ─────────────────────────────────────────────────────────

#[test]
fn growth_doubles_and_keeps_encoded_prefix() {
    let stride = TileVertex::STRIDE;
    let mut map = tilemap(1);

    map.tile(0u32, 0.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);
    assert_eq!(map.vertex_buffer().capacity_bytes(), 4 * stride);
    let first_quad = map.vertices().to_vec();
    let generation = map.vertex_buffer().generation();

    map.tile(0u32, 8.0, 0.0, &sized(8.0, 8.0)).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);
    assert_eq!(map.vertex_buffer().capacity_bytes(), 8 * stride);
    assert_eq!(&map.vertices()[..4], &first_quad[..]);
    assert_eq!(map.vertex_buffer().generation(), generation + 1);
}

#[test]
fn capacity_is_smallest_power_of_two_multiple() {
    let stride = TileVertex::STRIDE;
    let mut map = tilemap(1);
    for i in 0..5 {
        map.tile(0u32, i as f32 * 8.0, 0.0, &sized(8.0, 8.0)).unwrap();
    }
    map.prepare(&CompositeSignal::STANDALONE);

    // 5 tiles = 20 vertices -> 32 vertex slots.
    assert_eq!(map.vertex_buffer().capacity_bytes(), 32 * stride);
    assert_eq!(map.vertex_bytes().len(), 20 * stride);
}
