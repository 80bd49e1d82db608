use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use models::{token_rows, CaptionDecoder, CaptionDecoderConfig, CaptionEncoder, CaptionEncoderConfig};
use text_vocab::{caption_text, truncate_at_end, Vocabulary, END_INDEX};

type B = NdArray<f32>;

#[test]
fn encoder_decoder_produce_bounded_captions() -> anyhow::Result<()> {
    let device = Default::default();
    let mut vocab = Vocabulary::new();
    for word in ["a", "dog", "runs", "on", "grass"] {
        vocab.add_token(word);
    }

    let encoder = CaptionEncoder::<B>::new(
        CaptionEncoderConfig {
            embed_size: 16,
            channels: vec![4, 8],
        },
        &device,
    );
    let decoder = CaptionDecoder::<B>::new(
        CaptionDecoderConfig {
            embed_size: 16,
            hidden_size: 24,
            num_layers: 1,
            ..CaptionDecoderConfig::new(vocab.len())
        },
        &device,
    );

    let images = Tensor::<B, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let features = encoder.forward(images);
    let rows = token_rows(decoder.sample(features, None))?;
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), decoder.max_seq_len());
        assert!(row.iter().all(|&t| t < vocab.len()));
        let kept = truncate_at_end(row);
        assert!(!kept.contains(&END_INDEX));
        let text = caption_text(&vocab, row);
        assert!(!text.contains("<end>"));
    }
    Ok(())
}
