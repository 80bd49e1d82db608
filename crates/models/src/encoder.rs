use burn::module::Module;
use burn::nn;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct CaptionEncoderConfig {
    pub embed_size: usize,
    /// Output channels of each conv block; each block halves the spatial size.
    pub channels: Vec<usize>,
}

impl Default for CaptionEncoderConfig {
    fn default() -> Self {
        Self {
            embed_size: 256,
            channels: vec![32, 64, 128],
        }
    }
}

/// Image encoder: conv backbone, global average pool, linear projection, layer norm.
///
/// Backbone features are detached, so only the projection and norm receive gradients.
#[derive(Debug, Module)]
pub struct CaptionEncoder<B: Backend> {
    convs: Vec<Conv2d<B>>,
    pool: MaxPool2d,
    global_pool: AdaptiveAvgPool2d,
    fc: nn::Linear<B>,
    norm: nn::LayerNorm<B>,
}

impl<B: Backend> CaptionEncoder<B> {
    pub fn new(cfg: CaptionEncoderConfig, device: &B::Device) -> Self {
        let mut convs = Vec::with_capacity(cfg.channels.len());
        let mut in_channels = 3;
        for &out_channels in &cfg.channels {
            convs.push(
                Conv2dConfig::new([in_channels, out_channels], [3, 3])
                    .with_padding(nn::PaddingConfig2d::Same)
                    .init(device),
            );
            in_channels = out_channels;
        }
        Self {
            convs,
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc: nn::LinearConfig::new(in_channels, cfg.embed_size).init(device),
            norm: nn::LayerNormConfig::new(cfg.embed_size).init(device),
        }
    }

    /// `[batch, 3, H, W]` images to `[batch, embed_size]` features.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for conv in &self.convs {
            x = self.pool.forward(relu(conv.forward(x)));
        }
        let pooled = self.global_pool.forward(x);
        let [batch, channels, _, _] = pooled.dims();
        let features = pooled.reshape([batch, channels]).detach();
        self.norm.forward(self.fc.forward(features))
    }
}
