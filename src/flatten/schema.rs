use ahash::AHashMap;
use serde_json::Value;

/// Picks one positional widget value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    /// The value at this raw index.
    Position(usize),
    /// The n-th string value, skipping values of other kinds.
    Text(usize),
    /// The n-th number value, skipping values of other kinds.
    Number(usize),
}

impl FieldSelector {
    pub fn select<'v>(&self, values: &'v [Value]) -> Option<&'v Value> {
        match *self {
            FieldSelector::Position(index) => values.get(index),
            FieldSelector::Text(n) => values.iter().filter(|v| v.is_string()).nth(n),
            FieldSelector::Number(n) => values.iter().filter(|v| v.is_number()).nth(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetField {
    pub name: String,
    pub selector: FieldSelector,
}

/// Ordered parameter names for the positional widget values of one operator type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSchema {
    operator_type: String,
    fields: Vec<WidgetField>,
    min_texts: usize,
}

impl WidgetSchema {
    pub fn new(operator_type: impl Into<String>) -> Self {
        Self {
            operator_type: operator_type.into(),
            fields: Vec::new(),
            min_texts: 0,
        }
    }

    pub fn field(mut self, name: impl Into<String>, selector: FieldSelector) -> Self {
        self.fields.push(WidgetField {
            name: name.into(),
            selector,
        });
        self
    }

    /// Take no field at all unless the node carries at least `count` string values.
    pub fn requires_texts(mut self, count: usize) -> Self {
        self.min_texts = count;
        self
    }

    pub fn operator_type(&self) -> &str {
        &self.operator_type
    }

    pub fn fields(&self) -> &[WidgetField] {
        &self.fields
    }

    /// Same fields under a different operator type.
    pub fn renamed(&self, operator_type: impl Into<String>) -> Self {
        Self {
            operator_type: operator_type.into(),
            ..self.clone()
        }
    }

    /// Maps positional values to `(parameter name, value)` pairs, in field order.
    pub fn apply<'s, 'v>(&'s self, values: &'v [Value]) -> Vec<(&'s str, &'v Value)> {
        if values.iter().filter(|v| v.is_string()).count() < self.min_texts {
            return Vec::new();
        }
        self.fields
            .iter()
            .filter_map(|f| f.selector.select(values).map(|v| (f.name.as_str(), v)))
            .collect()
    }
}

/// Fills `registry` with every built-in schema.
pub(crate) fn register_default_schemas(registry: &mut AHashMap<String, WidgetSchema>) {
    for &operator_type in builtin_operator_types() {
        if let Some(schema) = builtin_schema(operator_type) {
            registry.insert(operator_type.to_string(), schema);
        }
    }
}

/// Defines the built-in schema table.
macro_rules! define_widget_schemas {
    ( $( $op:literal $( requires $texts:literal texts )? => [ $( $field:literal : $kind:ident($idx:literal) ),* $(,)? ] ),* $(,)? ) => {
        /// Looks up a built-in schema by operator type.
        pub fn builtin_schema(operator_type: &str) -> Option<WidgetSchema> {
            match operator_type {
                $( $op => Some(
                    WidgetSchema::new($op)
                        $( .requires_texts($texts) )?
                        $( .field($field, FieldSelector::$kind($idx)) )*
                ), )*
                _ => None,
            }
        }

        /// Every operator type with a built-in schema.
        pub fn builtin_operator_types() -> &'static [&'static str] {
            &[ $( $op ),* ]
        }
    };
}

define_widget_schemas! {
    // Text sources
    "CLIPTextEncode" => ["text": Text(0)],
    "CLIPTextEncodeSDXL" => ["text": Text(0)],
    "CLIPTextEncodeFlux" => ["text": Text(0)],
    "String" => ["text": Text(0)],
    "Text Multiline" => ["text": Text(0)],
    "CR Text" => ["text": Text(0)],
    "SpriteGenInject" => ["prompt": Position(0)],

    // Model loaders
    "UnetLoaderGGUF" => ["unet_name": Text(0)],
    "CLIPLoader" requires 2 texts => ["clip_name": Text(0), "type": Text(1)],
    "DualCLIPLoaderGGUF" requires 3 texts => [
        "clip_name1": Text(0),
        "clip_name2": Text(1),
        "type": Text(2),
    ],
    "VAELoader" => ["vae_name": Text(0)],
    "CheckpointLoaderSimple" => ["ckpt_name": Text(0)],
    "LoraLoaderModelOnly" requires 1 texts => ["lora_name": Text(0), "strength_model": Number(0)],
    "LoraLoader" requires 1 texts => [
        "lora_name": Text(0),
        "strength_model": Number(0),
        "strength_clip": Number(1),
    ],
    "ControlNetLoader" => ["control_net_name": Text(0)],

    // Sampling
    "KSamplerSelect" => ["sampler_name": Position(0)],
    "RandomNoise" => ["noise_seed": Position(0)],
    "Flux2Scheduler" => ["steps": Number(0), "width": Number(1), "height": Number(2)],
    "CFGGuider" => ["cfg": Number(0)],
    // widgets: seed, control_after_generate, steps, cfg, sampler_name, scheduler, denoise
    "KSampler" => [
        "seed": Position(0),
        "steps": Position(2),
        "cfg": Position(3),
        "sampler_name": Position(4),
        "scheduler": Position(5),
        "denoise": Position(6),
    ],
    // widgets: add_noise, noise_seed, control_after_generate, cfg
    "SamplerCustom" => ["add_noise": Position(0), "noise_seed": Position(1), "cfg": Position(3)],

    // Latents and images
    "EmptyFlux2LatentImage" => ["width": Number(0), "height": Number(1), "batch_size": Number(2)],
    "EmptyLatentImage" => ["width": Number(0), "height": Number(1), "batch_size": Number(2)],
    "SaveImage" => ["filename_prefix": Text(0)],
    "LoadImage" => ["image": Text(0)],
    "ImageScaleToTotalPixels" => [
        "upscale_method": Position(0),
        "megapixels": Position(1),
        "resolution_steps": Position(2),
    ],
    "ImageResizeKJv2" => [
        "width": Position(0),
        "height": Position(1),
        "upscale_method": Position(2),
        "keep_proportion": Position(3),
        "pad_color": Position(4),
        "crop_position": Position(5),
        "divisible_by": Position(6),
        "device": Position(7),
    ],
}
