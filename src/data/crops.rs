use crate::shared::*;

/// Populate the CropRegistry with all crop definitions.
///
/// Corn gains a full stage per watered day across 4 growth frames; tomato
/// grows slower (0.7 per day) across 3 frames, so fractional stages carry
/// over between days and the visual frame is the floored stage.
pub fn populate_crops(registry: &mut CropRegistry) {
    let crops = [
        CropDef {
            kind: SeedKind::Corn,
            name: "Corn".into(),
            growth_rate: 1.0,
            frames: 4,
        },
        CropDef {
            kind: SeedKind::Tomato,
            name: "Tomato".into(),
            growth_rate: 0.7,
            frames: 3,
        },
    ];

    for crop in crops {
        registry.crops.insert(crop.kind, crop);
    }
}
