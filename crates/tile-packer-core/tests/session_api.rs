use tile_packer_core::prelude::*;

#[test]
fn zero_tile_count_is_rejected() {
    match PackingSession::new(0, 100, 100) {
        Err(TilePackerError::WrongParameters(msg)) => assert!(msg.contains("tile count")),
        other => panic!("Expected WrongParameters, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn zero_canvas_dimension_is_rejected() {
    assert!(matches!(
        PackingSession::new(3, 0, 100),
        Err(TilePackerError::WrongParameters(_))
    ));
    assert!(matches!(
        PackingSession::new(3, 100, 0),
        Err(TilePackerError::WrongParameters(_))
    ));
}

#[test]
fn zero_sized_tile_fails_pack() {
    let mut s = PackingSession::new(2, 100, 100).unwrap();
    s.set_tile_size(0, 10, 10).unwrap();
    match s.pack() {
        Err(TilePackerError::WrongParameters(msg)) => assert!(msg.contains("tile 1")),
        other => panic!("Expected WrongParameters, got {:?}", other),
    }
    s.set_tile_size(1, 5, 5).unwrap();
    assert_eq!(s.pack().unwrap(), 2);
}

#[test]
fn tile_index_out_of_range() {
    let mut s = PackingSession::new(2, 100, 100).unwrap();
    assert_eq!(
        s.set_tile_size(2, 1, 1),
        Err(TilePackerError::TileIndexOutOfRange { index: 2, len: 2 })
    );
    assert!(s.tile(5).is_err());
}

#[test]
fn failed_pack_leaves_session_usable() {
    let mut s = PackingSession::with_tiles([(10, 10), (20, 20)], 100, 100).unwrap();
    s.resize_canvas(0, 100);
    assert!(s.pack().is_err());
    s.resize_canvas(100, 100);
    assert_eq!(s.pack().unwrap(), 2);
}

#[test]
fn second_pack_only_places_leftovers() {
    let mut s = PackingSession::with_tiles([(60, 60), (60, 60)], 100, 100).unwrap();
    s.options_mut().fail_policy = FailPolicy::Continue;
    assert_eq!(s.pack().unwrap(), 1);
    assert_eq!(s.result().canvases_used, 1);

    assert_eq!(s.pack().unwrap(), 1);
    assert_eq!(s.result().canvases_used, 2);
    assert_eq!(s.tiles()[0].canvas_index, Some(0));
    assert_eq!(s.tiles()[1].canvas_index, Some(1));

    // Nothing left: no tiles placed, no canvas opened.
    assert_eq!(s.pack().unwrap(), 0);
    assert_eq!(s.result().canvases_used, 2);
}

#[test]
fn always_repack_lays_out_again_after_resize() {
    let mut s = PackingSession::with_tiles([(60, 60), (60, 60)], 100, 100).unwrap();
    s.options_mut().fail_policy = FailPolicy::NewCanvas;
    assert_eq!(s.pack().unwrap(), 2);
    assert_eq!(s.result().canvases_used, 2);

    s.resize_canvas(130, 70);
    // Without repacking, resizing moves nothing.
    assert_eq!(s.pack().unwrap(), 0);
    assert_eq!(s.tiles()[1].canvas_index, Some(1));

    s.options_mut().always_repack = true;
    assert_eq!(s.pack().unwrap(), 2);
    assert_eq!(s.result().canvases_used, 1);
    let t = s.tiles();
    assert_eq!((t[0].x, t[0].y, t[0].canvas_index), (0, 0, Some(0)));
    assert_eq!((t[1].x, t[1].y, t[1].canvas_index), (60, 0, Some(0)));
}

#[test]
fn stats_report_occupancy() {
    let mut s = PackingSession::with_tiles([(50, 100), (50, 50), (30, 30)], 100, 100).unwrap();
    s.options_mut().fail_policy = FailPolicy::Continue;
    assert_eq!(s.pack().unwrap(), 3);
    let st = s.stats();
    assert_eq!(st.num_tiles, 3);
    assert_eq!(st.num_packed, 3);
    assert_eq!(st.num_canvases, 1);
    assert_eq!(st.total_canvas_area, 10_000);
    assert_eq!(st.used_tile_area, 5000 + 2500 + 900);
    assert!((st.occupancy - 0.84).abs() < 1e-9);
    assert_eq!(st.wasted_area(), 1600);
    assert!((st.waste_percentage() - 16.0).abs() < 1e-9);
    assert!(st.summary().contains("Tiles: 3/3"));
}

#[test]
fn into_tiles_returns_table_in_input_order() {
    let mut s = PackingSession::with_tiles([(1, 2), (3, 4)], 10, 10).unwrap();
    s.pack().unwrap();
    let tiles = s.into_tiles();
    assert_eq!((tiles[0].width, tiles[0].height), (1, 2));
    assert_eq!((tiles[1].width, tiles[1].height), (3, 4));
}

#[test]
fn independent_sessions_pack_on_threads() {
    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            std::thread::spawn(move || {
                let sizes: Vec<(u32, u32)> = (1..=20).map(|k| (k + i, 21 - k)).collect();
                let mut s = PackingSession::with_tiles(sizes, 128, 128).unwrap();
                s.pack().unwrap()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 20);
    }
}

#[test]
fn pack_with_nothing_to_place_keeps_shrunk_layout() {
    let mut s = PackingSession::with_tiles([(25, 25); 4], 200, 200).unwrap();
    s.options_mut().shrink_final_canvas = true;
    assert_eq!(s.pack().unwrap(), 4);
    let result = *s.result();
    let tiles = s.tiles().to_vec();
    let free: Vec<Rect> = s.free_areas().collect();
    let offset = s.dst_offset(3, 2, 1).unwrap();
    assert!(result.last_canvas_width < 200);

    assert_eq!(s.pack().unwrap(), 0);
    assert_eq!(*s.result(), result);
    assert_eq!(s.tiles(), &tiles[..]);
    assert_eq!(s.free_areas().collect::<Vec<_>>(), free);
    assert_eq!(s.dst_offset(3, 2, 1).unwrap(), offset);
}

#[test]
fn leftover_that_never_fits_keeps_free_areas() {
    let mut s = PackingSession::with_tiles([(60, 60), (120, 10)], 100, 100).unwrap();
    s.options_mut().fail_policy = FailPolicy::Continue;
    assert_eq!(s.pack().unwrap(), 1);
    let free: Vec<Rect> = s.free_areas().collect();
    assert_eq!(s.pool().total_area(), 10_000 - 3600);

    assert_eq!(s.pack().unwrap(), 0);
    assert_eq!(s.free_areas().collect::<Vec<_>>(), free);
    assert_eq!(s.result().canvases_used, 1);

    // 120x10 ranks first, so Stop reports nothing processed before it.
    s.options_mut().fail_policy = FailPolicy::Stop;
    assert_eq!(s.ranked(), &[1, 0]);
    assert_eq!(s.pack().unwrap(), 0);
    assert_eq!(s.free_areas().collect::<Vec<_>>(), free);
}

#[test]
fn new_canvas_give_up_still_shrinks_last_canvas() {
    let opts = PackerOptions::builder()
        .fail_policy(FailPolicy::NewCanvas)
        .tiles_presorted(true)
        .shrink_final_canvas(true)
        .build();
    let mut s = PackingSession::with_tiles([(10, 10), (60, 60)], 50, 50).unwrap();
    s.set_options(opts);
    assert_eq!(s.pack().unwrap(), 1);

    let r = *s.result();
    assert_eq!(r.canvases_used, 1);
    assert!(r.last_canvas_width < 50 && r.last_canvas_height < 50);
    let t = s.tiles()[0];
    assert!(Rect::new(0, 0, r.last_canvas_width, r.last_canvas_height)
        .contains(&t.placed_rect().unwrap()));
    assert_eq!(
        s.pool().total_area() + t.area(),
        r.last_canvas_width as u64 * r.last_canvas_height as u64
    );
}
