use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct PriceRegressorConfig {
    /// Number of encoded + scaled features
    pub input_dim: usize,
    #[config(default = 64)]
    pub hidden1:   usize,
    #[config(default = 32)]
    pub hidden2:   usize,
    #[config(default = 16)]
    pub hidden3:   usize,
}

impl PriceRegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PriceRegressor<B> {
        PriceRegressor {
            dense1: LinearConfig::new(self.input_dim, self.hidden1).init(device),
            dense2: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            dense3: LinearConfig::new(self.hidden2, self.hidden3).init(device),
            output: LinearConfig::new(self.hidden3, 1).init(device),
        }
    }

    /// (inputs, outputs) of every dense layer, input to output.
    pub fn layer_shapes(&self) -> [(usize, usize); 4] {
        [
            (self.input_dim, self.hidden1),
            (self.hidden1, self.hidden2),
            (self.hidden2, self.hidden3),
            (self.hidden3, 1),
        ]
    }

    /// Text description of the architecture, one line per layer.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{:<10} {:>8} {:>8} {:>10}", "layer", "in", "out", "params")];
        let mut total = 0;
        for (i, (input, output)) in self.layer_shapes().iter().enumerate() {
            let params = input * output + output;
            total += params;
            let name = if i == 3 { "output".to_string() } else { format!("dense{}", i + 1) };
            let act  = if i == 3 { "linear" } else { "relu" };
            lines.push(format!("{name:<10} {input:>8} {output:>8} {params:>10}  {act}"));
        }
        lines.push(format!("total trainable parameters: {total}"));
        lines.join("\n")
    }
}

#[derive(Module, Debug)]
pub struct PriceRegressor<B: Backend> {
    pub dense1: Linear<B>,
    pub dense2: Linear<B>,
    pub dense3: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> PriceRegressor<B> {
    /// features: [batch, input_dim] → prices: [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.dense1.forward(features));
        let x = relu(self.dense2.forward(x));
        let x = relu(self.dense3.forward(x));
        self.output.forward(x)
    }

    /// Mean-squared error between predictions and `prices` ([batch, 1]).
    pub fn forward_loss(&self, features: Tensor<B, 2>, prices: Tensor<B, 2>) -> Tensor<B, 1> {
        let predictions = self.forward(features);
        MseLoss::new().forward(predictions, prices, Reduction::Mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::trainer::tests::lock_backend_rng;
    use burn::backend::NdArray;

    #[test]
    fn test_forward_shape() {
        let _rng   = lock_backend_rng();
        let device = Default::default();
        let model: PriceRegressor<NdArray> = PriceRegressorConfig::new(5).init(&device);
        let out = model.forward(Tensor::zeros([3, 5], &device));
        assert_eq!(out.dims(), [3, 1]);
    }

    #[test]
    fn test_parameter_count_matches_summary() {
        let _rng   = lock_backend_rng();
        let device = Default::default();
        let cfg    = PriceRegressorConfig::new(12);
        let model: PriceRegressor<NdArray> = cfg.init(&device);
        // 12*64+64 + 64*32+32 + 32*16+16 + 16*1+1
        assert_eq!(model.num_params(), 3457);
        assert!(cfg.summary().ends_with("total trainable parameters: 3457"));
    }
}
