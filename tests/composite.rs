use tilebatch::*;

fn tex(id: u64) -> TextureHandle {
    TextureHandle::new(BaseTextureId(id), 32.0, 32.0)
}

// Two tileset slots per layer: two units holding one texture each.
fn small_settings() -> TilemapSettings {
    TilemapSettings { max_texture_units: 2, textures_per_unit: 1, ..TilemapSettings::default() }
}

fn opts() -> TileOptions {
    TileOptions::new().size(32.0, 32.0)
}

// ── Layer routing ─────────────────────────────────────────────────────────

#[test]
fn initial_tileset_is_split_into_layers() {
    let tileset = Tileset::from_textures((0..5).map(tex));
    let composite = CompositeTilemap::new(tileset, small_settings()).unwrap();

    let sizes: Vec<usize> = composite.layers().iter().map(|l| l.tileset().len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn numeric_index_routes_to_layer_slot() {
    let tileset = Tileset::from_textures((0..4).map(tex));
    let mut composite = CompositeTilemap::new(tileset, small_settings()).unwrap();

    let id = composite.tile(3u32, 0.0, 0.0, &opts()).unwrap();
    assert_eq!(id.layer, 1);
    let rec = composite.layers()[1].tile_record(id.tile).unwrap();
    assert_eq!(rec.texture_index, 1);
}

#[test]
fn numeric_index_past_last_layer_is_rejected() {
    let tileset = Tileset::from_textures((0..2).map(tex));
    let mut composite = CompositeTilemap::new(tileset, small_settings()).unwrap();

    let err = composite.tile(9u32, 0.0, 0.0, &opts()).unwrap_err();
    assert!(matches!(err, TilemapError::UnresolvedTexture(_)));
    assert!(composite.is_empty());
}

#[test]
fn handles_open_new_layers_when_full() {
    let mut composite = CompositeTilemap::new(Tileset::new(), small_settings()).unwrap();
    let (a, b, c) = (tex(1), tex(2), tex(3));

    assert_eq!(composite.tile(&a, 0.0, 0.0, &opts()).unwrap().layer, 0);
    assert_eq!(composite.tile(&b, 32.0, 0.0, &opts()).unwrap().layer, 0);
    assert_eq!(composite.tile(&a, 64.0, 0.0, &opts()).unwrap().layer, 0);
    assert_eq!(composite.tile(&c, 96.0, 0.0, &opts()).unwrap().layer, 1);
    assert_eq!(composite.layers().len(), 2);
}

#[test]
fn handles_never_go_back_to_earlier_layers() {
    let mut composite = CompositeTilemap::new(Tileset::new(), small_settings()).unwrap();
    let (a, b, c) = (tex(1), tex(2), tex(3));
    composite.tile(&a, 0.0, 0.0, &opts()).unwrap();
    composite.tile(&b, 0.0, 0.0, &opts()).unwrap();
    composite.tile(&c, 0.0, 0.0, &opts()).unwrap();

    // `a` lives in layer 0, but drawing it there would put it under `c`.
    let id = composite.tile(&a, 0.0, 0.0, &opts()).unwrap();
    assert_eq!(id.layer, 1);
    assert_eq!(composite.layers()[1].tileset().len(), 2);
}

// ── Editing ───────────────────────────────────────────────────────────────

#[test]
fn last_tile_edits_follow_the_routed_layer() {
    let mut composite = CompositeTilemap::new(Tileset::new(), small_settings()).unwrap();
    composite.tile_alpha_last(0.5).unwrap();

    for id in 1..=3 {
        composite.tile(&tex(id), 0.0, 0.0, &opts()).unwrap();
    }
    composite.tile_rotate_last(4).unwrap();
    composite.tile_anim_x_last(32.0, 2.0).unwrap();

    let last = composite.last_tile().unwrap();
    let rec = composite.layers()[last.layer].tile_record(last.tile).unwrap();
    assert_eq!(last.layer, 1);
    assert_eq!((rec.rotate, rec.anim_x, rec.anim_count_x), (4, 32.0, 2.0));
    assert!(composite.has_animated_tile());
}

#[test]
fn clear_empties_every_layer() {
    let mut composite = CompositeTilemap::new(Tileset::new(), small_settings()).unwrap();
    for id in 1..=3 {
        composite.tile(&tex(id), id as f32 * 10.0, 0.0, &opts()).unwrap();
    }
    composite.clear();

    assert!(composite.is_empty());
    assert!(composite.bounds().is_empty());
    assert!(composite.last_tile().is_none());
    // Layers are kept, so the next tile starts over at layer 0.
    assert_eq!(composite.tile(&tex(1), 0.0, 0.0, &opts()).unwrap().layer, 0);
}

// ── Bounds ────────────────────────────────────────────────────────────────

#[test]
fn bounds_union_all_layers() {
    let mut composite = CompositeTilemap::new(Tileset::new(), small_settings()).unwrap();
    composite.tile(&tex(1), 0.0, 0.0, &opts()).unwrap();
    composite.tile(&tex(2), 100.0, 0.0, &opts()).unwrap();
    composite.tile(&tex(3), 0.0, 200.0, &opts()).unwrap();

    assert_eq!(
        composite.bounds().rect(),
        Some(Rect { min_x: 0.0, min_y: 0.0, max_x: 132.0, max_y: 232.0 })
    );
}

// ── Frame preparation ─────────────────────────────────────────────────────

#[test]
fn anim_frame_change_refreshes_every_layer_once() {
    let tileset = Tileset::from_textures((0..4).map(tex));
    let mut composite = CompositeTilemap::new(tileset, small_settings()).unwrap();
    composite.tile(0u32, 0.0, 0.0, &opts()).unwrap();
    composite.tile(2u32, 0.0, 0.0, &opts()).unwrap();

    assert_eq!(composite.prepare(), 2);
    assert_eq!(composite.prepare(), 0);

    composite.set_tile_anim(1.0, 0.0);
    assert_eq!(composite.tile_anim(), [1.0, 0.0]);
    assert_eq!(composite.prepare(), 2);
    assert_eq!(composite.prepare(), 0);

    // Same frame again: no refresh.
    composite.set_tile_anim(1.0, 0.0);
    assert_eq!(composite.prepare(), 0);
}

#[test]
fn layers_encode_with_sub_atlas_packing() {
    let settings = TilemapSettings { max_texture_units: 2, textures_per_unit: 4, ..TilemapSettings::default() };
    let tileset = Tileset::from_textures((0..8).map(tex));
    let mut composite = CompositeTilemap::new(tileset, settings).unwrap();
    composite.set_texture_offset(256.0, 128.0);

    composite.tile(5u32, 0.0, 0.0, &opts()).unwrap();
    composite.prepare();

    let v = composite.layers()[0].vertices();
    assert_eq!(v[0].texture_id, 1.0);
    assert_eq!(v[0].uv, [256.0, 0.0]);
}

#[test]
fn single_bound_unit_skips_sub_atlas_shift() {
    let settings = TilemapSettings { max_texture_units: 1, ..TilemapSettings::default() };
    let tileset = Tileset::from_textures((0..2).map(tex));
    let mut composite = CompositeTilemap::new(tileset, settings).unwrap();
    assert_eq!(composite.signal().packing(), tilebatch::renderer::encoder::TexturePacking::Direct);

    let id = composite.tile(1u32, 0.0, 0.0, &opts()).unwrap();
    composite.prepare();

    assert_eq!(id.layer, 1);
    let v = composite.layers()[1].vertices();
    assert_eq!(v[0].texture_id, 0.0);
    assert_eq!(v[0].uv, [0.0, 0.0]);
}

#[test]
fn standalone_tilemap_uses_index_as_unit() {
    let mut map = Tilemap::new(Tileset::from_textures((0..8).map(tex)));
    map.tile(5u32, 0.0, 0.0, &opts()).unwrap();
    map.prepare(&CompositeSignal::STANDALONE);

    assert_eq!(map.vertices()[0].texture_id, 5.0);
    assert_eq!(map.vertices()[0].uv, [0.0, 0.0]);
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = TilemapSettings { textures_per_unit: 0, ..TilemapSettings::default() };
    assert!(matches!(
        CompositeTilemap::new(Tileset::new(), settings),
        Err(TilemapError::InvalidSettings(_))
    ));
}
